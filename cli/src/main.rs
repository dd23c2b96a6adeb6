//! Query Canvas CLI: render, parse, join and run SPARQL SELECT queries

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use querycanvas::query::TemplateValue;
use querycanvas::sparql::BoundTerm;
use querycanvas::{
    CanvasConfig, EndpointClient, HttpEndpointClient, JoinMode, QueryCanvas, QueryTemplate,
    RdfParser, RdfStore, SelectResults, SparqlParser, SpinExporter,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Endpoint assumed for SPIN files loaded from disk
const LOCAL_ENDPOINT: &str = "urn:querycanvas:local";

#[derive(Parser)]
#[command(name = "querycanvas", version, about = "Compose and run SPARQL SELECT queries")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "QUERYCANVAS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides the configuration)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format for results
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Substitution,
    Service,
}

impl From<ModeArg> for JoinMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Substitution => JoinMode::Substitution,
            ModeArg::Service => JoinMode::Service,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a SPIN query as SPARQL
    Render {
        /// Turtle or RDF/XML file holding the SPIN description
        spin_file: PathBuf,
        /// URI of the query node
        query_uri: String,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Parse SPARQL text and print it in canonical form
    Parse {
        sparql_file: PathBuf,
        /// Print SPIN Turtle instead of SPARQL
        #[arg(long)]
        spin: bool,
        /// URI given to the parsed query
        #[arg(long, default_value = "urn:querycanvas:parsed")]
        uri: String,
    },
    /// Join two SPIN queries on a variable
    Join {
        spin_file: PathBuf,
        left_uri: String,
        left_var: String,
        right_uri: String,
        right_var: String,
        #[arg(long, value_enum, default_value = "substitution")]
        mode: ModeArg,
        /// Endpoint the left query runs against
        #[arg(long)]
        left_endpoint: Option<String>,
        /// Endpoint the right query runs against
        #[arg(long)]
        right_endpoint: Option<String>,
    },
    /// Print a discovery query for one variable of a SPIN query
    Describe {
        spin_file: PathBuf,
        query_uri: String,
        variable: String,
        /// Ask for classes instead of properties
        #[arg(long)]
        classes: bool,
    },
    /// Run SPARQL text against an endpoint
    Run {
        endpoint: String,
        sparql_file: PathBuf,
    },
    /// List configured endpoints
    Endpoints,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match CanvasConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: cannot load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => CanvasConfig::default(),
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CanvasConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render {
            spin_file,
            query_uri,
            offset,
            limit,
        } => {
            let mut canvas = config.build_canvas()?;
            let id = load_and_instantiate(&mut canvas, &config, &spin_file, &query_uri, None)?;
            let mut options = config.serialize_options();
            options.offset = offset.or(options.offset);
            options.limit = limit.or(options.limit);
            print!("{}", canvas.serialize(&id, &options)?);
        }
        Commands::Parse {
            sparql_file,
            spin,
            uri,
        } => {
            let text = read(&sparql_file)?;
            let parsed = SparqlParser::parse_select(&text, &uri)?;
            if spin {
                let triples = SpinExporter::export(&parsed.query, &uri)?;
                print!("{}", querycanvas::rdf::RdfSerializer::to_turtle(&triples)?);
            } else {
                let namespaces = config.namespaces();
                print!(
                    "{}",
                    querycanvas::SparqlSerializer::new(&namespaces).serialize(&parsed.query, &parsed.options)
                );
            }
        }
        Commands::Join {
            spin_file,
            left_uri,
            left_var,
            right_uri,
            right_var,
            mode,
            left_endpoint,
            right_endpoint,
        } => {
            let mut canvas = config.build_canvas()?;
            let left = load_and_instantiate(
                &mut canvas,
                &config,
                &spin_file,
                &left_uri,
                left_endpoint.as_deref(),
            )?;
            let right = canvas.instantiate(&right_uri, right_endpoint.as_deref())?;
            let joined = canvas.join(
                (left.as_str(), left_var.as_str()),
                (right.as_str(), right_var.as_str()),
                mode.into(),
            )?;
            info!(id = %joined, "Joined queries");
            print!("{}", canvas.serialize(&joined, &config.serialize_options())?);
        }
        Commands::Describe {
            spin_file,
            query_uri,
            variable,
            classes,
        } => {
            let mut canvas = config.build_canvas()?;
            let id = load_and_instantiate(&mut canvas, &config, &spin_file, &query_uri, None)?;
            let template = if classes {
                QueryTemplate::describe_variable_classes()?
            } else {
                QueryTemplate::describe_variable_properties()?
            };
            let mut values = HashMap::new();
            values.insert("variable".to_string(), TemplateValue::Variable(variable));
            print!("{}", canvas.render_template(&id, &template, &values)?);
        }
        Commands::Run {
            endpoint,
            sparql_file,
        } => {
            let text = read(&sparql_file)?;
            // Canonicalize through the model so the endpoint gets the same text `parse` prints
            let parsed = SparqlParser::parse_select(&text, "urn:querycanvas:run")?;
            let mut options = parsed.options;
            if options.limit.is_none() {
                options.limit = config.default_limit;
            }
            let client = HttpEndpointClient::new(config.http_timeout())?;
            let namespaces = config.namespaces();
            let results = client
                .select_query(&endpoint, &parsed.query, &namespaces, &options)
                .await
                .with_context(|| format!("query against {} failed", endpoint))?;
            print_results(&results, &cli.format)?;
        }
        Commands::Endpoints => {
            let canvas = config.build_canvas()?;
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Endpoint", "Label", "Comment"]);
            for info in canvas.endpoints().iter() {
                table.add_row(vec![
                    info.uri.clone(),
                    info.label.clone(),
                    info.comment.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Load every query of a SPIN file into the catalog and instantiate one
fn load_and_instantiate(
    canvas: &mut QueryCanvas,
    config: &CanvasConfig,
    spin_file: &Path,
    query_uri: &str,
    endpoint: Option<&str>,
) -> anyhow::Result<String> {
    let triples = RdfParser::parse_file(spin_file)
        .with_context(|| format!("cannot parse {}", spin_file.display()))?;
    let graph = RdfStore::from_triples(triples);
    let importer = config.importer();

    let report = canvas.queries_mut().load_graph(&graph, LOCAL_ENDPOINT, &importer);
    for failure in &report.failed {
        eprintln!("warning: {}", failure);
    }
    if !canvas.queries().contains(query_uri) {
        // Unlabelled queries are skipped by catalog loading; load this one directly
        canvas
            .queries_mut()
            .load_query(&graph, query_uri, Some(LOCAL_ENDPOINT), &importer)?;
    }
    Ok(canvas.instantiate(query_uri, endpoint)?)
}

fn print_results(results: &SelectResults, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = results
                .solutions
                .iter()
                .map(|solution| {
                    let row: serde_json::Map<String, serde_json::Value> = solution
                        .bindings
                        .iter()
                        .map(|(name, term)| (name.clone(), serde_json::Value::from(term.lexical())))
                        .collect();
                    serde_json::Value::Object(row)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Csv => {
            println!("{}", results.variables.join(","));
            for solution in &results.solutions {
                let cells: Vec<String> = results
                    .variables
                    .iter()
                    .map(|v| solution.get(v).map(format_csv_value).unwrap_or_default())
                    .collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if results.variables.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&results.variables);
            for solution in &results.solutions {
                let cells: Vec<String> = results
                    .variables
                    .iter()
                    .map(|v| solution.get(v).map(format_table_value).unwrap_or_default())
                    .collect();
                table.add_row(cells);
            }
            println!("{}", table);
            println!("{} row(s)", results.len());
        }
    }
    Ok(())
}

fn format_table_value(term: &BoundTerm) -> String {
    match term {
        BoundTerm::Iri(iri) => format!("<{}>", iri),
        BoundTerm::BlankNode(id) => format!("_:{}", id),
        BoundTerm::Literal(lit) => lit.value().to_string(),
    }
}

fn format_csv_value(term: &BoundTerm) -> String {
    let value = term.lexical();
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

