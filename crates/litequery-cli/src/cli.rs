use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Database file to use instead of the configured one (":memory:" for a temporary database)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub db: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a default config file with documentation
    DefConfig,

    /// Print the configuration file to stdout
    Config,

    /// Create the tables declared in schema files
    Apply {
        /// Schema files to apply (defaults to `schema_paths` from the config)
        #[arg(required = false, value_hint = ValueHint::FilePath)]
        schemas: Vec<String>,
    },

    /// Print the DDL a schema file would run, without touching the database
    #[command(arg_required_else_help = true)]
    Ddl {
        /// Schema file to compile
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        schema: String,
    },

    /// List tables in the database
    #[clap(name = "tables", visible_alias = "ls")]
    Tables,

    /// Drop a table
    #[command(arg_required_else_help = true)]
    Drop {
        /// Table to drop
        #[arg(required = true)]
        table: String,
    },

    /// Query rows from a table
    #[command(arg_required_else_help = true)]
    #[clap(name = "select", visible_alias = "s")]
    Select {
        /// Table to query
        #[arg(required = true)]
        table: String,

        /// Columns to return, comma separated
        #[arg(required = false, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Condition joined with AND, e.g. `stock>=50`, `name like %ham%`, `id in 1,2,3`
        #[arg(required = false, short = 'w', long = "where")]
        filter: Vec<String>,

        /// Condition joined with OR; `--where` and `--or` apply in the order given
        #[arg(required = false, long)]
        or: Vec<String>,

        /// Column to order by
        #[arg(required = false, long)]
        order_by: Option<String>,

        /// Order descending
        #[arg(required = false, long, requires = "order_by")]
        desc: bool,

        /// Maximum number of rows
        #[arg(required = false, short, long)]
        limit: Option<u32>,

        /// Number of rows to skip
        #[arg(required = false, long)]
        offset: Option<u32>,
    },

    /// Run a raw SQL statement
    #[command(arg_required_else_help = true)]
    Sql {
        /// Statement to run, with `?` placeholders
        #[arg(required = true)]
        statement: String,

        /// Values bound to the placeholders, in order
        #[arg(required = false)]
        params: Vec<String>,
    },
}
