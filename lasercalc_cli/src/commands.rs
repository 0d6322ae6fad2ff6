//! Command handlers. Each returns `anyhow::Result`; calculator failures
//! travel as `CalcError` inside the anyhow error so `main` can print them
//! as JSON.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use lasercalc_core::file_io::{load_settings, load_worksheet, save_worksheet, FileLock};
use lasercalc_core::reference::kerf::{get_kerf_width, recommended_nozzles};
use lasercalc_core::reference::piercing::{get_pierce_time, pierce_time_range};
use lasercalc_core::{Report, ShopSettings, Worksheet};
use serde::Serialize;

use crate::cli::{CalcArgs, GlobalArgs, LookupCommand, TemplateArgs, WorksheetCommand};

pub fn calc(global: &GlobalArgs, args: &CalcArgs) -> anyhow::Result<()> {
    let settings = shop_settings(global)?;
    let item = settings.item_from_json(read_json(&args.input)?)?;
    let outcome = item.evaluate()?;

    if args.report {
        print!("{}", Report::for_item(&item, &outcome)?.render_text());
    } else {
        print_json(&outcome)?;
    }
    Ok(())
}

pub fn template(global: &GlobalArgs, args: &TemplateArgs) -> anyhow::Result<()> {
    let item = shop_settings(global)?.template(&args.calc_type)?;
    print_json(&item)
}

pub fn lookup(cmd: &LookupCommand) -> anyhow::Result<()> {
    match cmd {
        LookupCommand::Pierce(a) => {
            #[derive(Serialize)]
            struct PierceLookup {
                seconds_per_pierce: lasercalc_core::Lookup<f64>,
                base_range_s: lasercalc_core::Lookup<lasercalc_core::RangeValue>,
            }
            print_json(&PierceLookup {
                seconds_per_pierce: get_pierce_time(a.material, a.thickness, a.strategy, a.quality),
                base_range_s: pierce_time_range(a.material, a.thickness),
            })
        }
        LookupCommand::Kerf(a) => {
            #[derive(Serialize)]
            struct KerfLookup {
                kerf_width_mm: lasercalc_core::Lookup<f64>,
                recommended_nozzles: Vec<String>,
            }
            print_json(&KerfLookup {
                kerf_width_mm: get_kerf_width(a.material, a.thickness, a.nozzle),
                recommended_nozzles: recommended_nozzles(a.thickness).iter().map(|n| n.to_string()).collect(),
            })
        }
    }
}

pub fn worksheet(global: &GlobalArgs, cmd: &WorksheetCommand) -> anyhow::Result<()> {
    match cmd {
        WorksheetCommand::New(a) => {
            if a.path.exists() && !a.force {
                bail!("{} already exists (use --force to overwrite)", a.path.display());
            }
            let mut ws = Worksheet::new(&a.estimator, &a.job, &a.customer);
            if global.settings.is_some() {
                ws.settings = shop_settings(global)?;
            }
            save_worksheet(&ws, &a.path)?;
            println!("{}", a.path.display());
            Ok(())
        }
        WorksheetCommand::Add(a) => {
            let _lock = FileLock::acquire(&a.path, a.user.as_str())?;
            let mut ws = load_worksheet(&a.path)?;
            let settings = match &global.settings {
                Some(_) => shop_settings(global)?,
                None => ws.settings.clone(),
            };
            let item = settings.item_from_json(read_json(&a.input)?)?;
            // refuse to store an input that cannot be evaluated
            item.evaluate()?;
            let calc_type = item.calc_type();
            let id = ws.add_item(item);
            save_worksheet(&ws, &a.path)?;
            tracing::debug!(%id, calc_type, path = %a.path.display(), "item added");
            println!("{}", id);
            Ok(())
        }
        WorksheetCommand::Run(a) => {
            let ws = load_worksheet(&a.path)?;
            let entries = ws.evaluate_all();

            if a.report {
                for entry in &entries {
                    match (&entry.outcome, ws.get_item(&entry.id)) {
                        (Ok(outcome), Some(item)) => {
                            print!("{}", Report::for_item(item, outcome)?.render_text());
                            println!();
                        }
                        (Err(e), _) => println!("{} ({}): {}\n", entry.label, entry.calc_type, e),
                        (Ok(_), None) => {}
                    }
                }
            } else {
                print_json(&entries)?;
            }

            let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
            if failed > 0 {
                bail!("{} of {} worksheet items failed", failed, entries.len());
            }
            Ok(())
        }
    }
}

fn shop_settings(global: &GlobalArgs) -> anyhow::Result<ShopSettings> {
    match &global.settings {
        Some(path) => Ok(load_settings(path)?),
        None => Ok(ShopSettings::default()),
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    tracing::debug!(path = %path.display(), "reading input");
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
