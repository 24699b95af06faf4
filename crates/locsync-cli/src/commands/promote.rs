use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, EXIT_PARTIAL, load_context_or_exit, load_reference, print_json,
    write_report,
};
use locsync_core::{PromoteReport, promote};
use locsync_store::{Applied, CatalogRun, Persist, TranslationRow, translation_csv};
use serde_json::json;
use std::path::PathBuf;

const KIND: &str = "locsync.promote.v1";

pub struct Args {
    pub donor: Option<String>,
    pub export: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

#[derive(Debug)]
pub enum PromoteError {
    /// No donor, or the reference is unusable.
    Fatal(String),
    /// The donor could not be read or parsed.
    Donor(String),
}

pub struct PromoteOutcome {
    pub donor: String,
    pub run: CatalogRun<PromoteReport>,
    /// One row per healed reference key, valued from the donor.
    pub rows: Vec<TranslationRow>,
    pub export_path: Option<PathBuf>,
}

pub fn execute(
    ctx: &Context,
    donor: Option<&str>,
    export: Option<&str>,
    dry_run: bool,
) -> Result<PromoteOutcome, PromoteError> {
    let donor_name = donor
        .map(str::to_string)
        .or_else(|| ctx.config.promote.donor.clone())
        .ok_or_else(|| {
            PromoteError::Fatal("no donor catalog: pass --donor or set [promote] donor".to_string())
        })?;
    if donor_name == ctx.config.reference {
        return Err(PromoteError::Fatal(
            "donor and reference are the same catalog".to_string(),
        ));
    }

    let batch = ctx.batch();
    load_reference(&batch).map_err(PromoteError::Fatal)?;
    let donor = batch
        .load(&donor_name)
        .map_err(|failure| PromoteError::Donor(format!("{}: {}", failure.name, failure.message)))?;

    let persist = if dry_run {
        Persist::Discard
    } else {
        Persist::InPlace
    };
    let run = batch
        .run_single(&ctx.config.reference, &persist, |mut catalog| {
            let report = promote(catalog.root_mut(), donor.root());
            if report.changed() {
                Applied::rewrite(report, catalog.into_root())
            } else {
                Applied::keep(report)
            }
        })
        .map_err(|failure| PromoteError::Fatal(failure.message))?;

    let rows: Vec<TranslationRow> = run
        .outcome
        .filled
        .iter()
        .map(|insertion| TranslationRow::from_insertion(&run.locale, insertion))
        .collect();
    let mut export_path = None;
    if !dry_run && !rows.is_empty() {
        let path = ctx.report_path(export, &ctx.config.reports.promoted_csv);
        write_report(&path, &translation_csv(&run.locale, &rows)).map_err(PromoteError::Fatal)?;
        export_path = Some(path);
    }

    Ok(PromoteOutcome {
        donor: donor_name,
        run,
        rows,
        export_path,
    })
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let outcome = match execute(
        &ctx,
        args.donor.as_deref(),
        args.export.as_deref(),
        args.dry_run,
    ) {
        Ok(result) => result,
        Err(PromoteError::Fatal(e)) => {
            eprintln!("error: {e}");
            std::process::exit(EXIT_FATAL);
        }
        Err(PromoteError::Donor(e)) => {
            eprintln!("error: donor unusable: {e}");
            std::process::exit(EXIT_PARTIAL);
        }
    };

    if args.json {
        print_json(
            KIND,
            json!({
                "dryRun": args.dry_run,
                "donor": outcome.donor,
                "run": outcome.run,
                "rows": outcome.rows,
                "export": outcome.export_path.as_ref().map(|p| p.display().to_string()),
            }),
        );
    } else {
        let run = &outcome.run;
        println!(
            "[promote] {}: filled {} empty keys from {}",
            run.name,
            run.outcome.filled.len(),
            outcome.donor
        );
        for insertion in &run.outcome.filled {
            println!("  + {}", insertion.path);
        }
        if let Some(backup) = &run.backup {
            println!("backup: {} ({})", backup.name, backup.digest);
        }
        if let Some(path) = &outcome.export_path {
            println!("promoted CSV: {}", path.display());
        }
    }
}
