use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "locsync",
    about = "locsync: reconcile locale catalogs against a reference catalog",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: ./locsync.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Locales directory (overrides `locales_dir`)
    #[arg(long, global = true)]
    pub locales: Option<String>,

    /// Reference catalog name (overrides `reference`)
    #[arg(long, global = true)]
    pub reference: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report missing and extra key paths of every target
    Diff {
        /// Report file (default: [reports] diff_json)
        #[arg(long)]
        report: Option<String>,

        /// Exit 0 even when targets drift from the reference
        #[arg(long)]
        allow_drift: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add reference keys missing from every target, keeping existing values
    Fill {
        /// Translator CSV (default: [reports] missing_csv)
        #[arg(long)]
        export: Option<String>,

        /// Compute without writing catalogs or reports
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild every target in the reference's exact shape and order
    Rebuild {
        /// Overwrite targets (after backup) instead of writing <stem>.synced.json
        #[arg(long)]
        in_place: bool,

        /// Compute without writing catalogs or reports
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill empty reference values from a donor catalog
    Promote {
        /// Donor catalog name (default: [promote] donor)
        #[arg(long)]
        donor: Option<String>,

        /// CSV of promoted keys (default: [reports] promoted_csv)
        #[arg(long)]
        export: Option<String>,

        /// Compute without writing
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace values that merely repeat their own key path
    Selfrefs {
        /// Catalog to repair (default: the reference)
        #[arg(long)]
        target: Option<String>,

        /// Compute without writing
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List empty-string leaves in every catalog
    Empty {
        /// CSV file (default: [reports] empty_csv)
        #[arg(long)]
        export: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Coverage of every catalog against the reference
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List reference strings whose target value is blank
    Pending {
        /// CSV file (default: [reports] pending_csv)
        #[arg(long)]
        export: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write configured seed values into every catalog where vacant
    Seed {
        /// Compute without writing
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Declare key paths (one per line) in the reference catalog
    Declare {
        /// File of dotted key paths
        keys_file: String,

        /// Value for newly declared keys
        #[arg(long, default_value = "")]
        value: String,

        /// Compute without writing
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new locale catalog shaped like the reference, all values blank
    Init {
        /// Locale identifier, e.g. `pt-BR`
        locale: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
