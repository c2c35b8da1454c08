use std::io::Read;

use clap::{Arg, ArgMatches, Command};
use ens_subgraph::client::SubgraphClient;
use ens_subgraph::config::ClientConfig;
use ens_subgraph::network::Network;
use ens_subgraph::policy::FetchPolicy;
use ens_subgraph::query::GraphQlRequest;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("ens-subgraph")
        .version("0.1.0")
        .about("Query the ENS subgraph for the configured network")
        .subcommand_required(true)
        .arg(
            Arg::new("network")
                .long("network")
                .value_name("ID")
                .global(true)
                .help("Network to query (1, 5, mainnet, goerli).\nDefault: read from DEFAULT_NETWORK"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .global(true)
                .help("Override the subgraph URL selected by the network"),
        )
        .subcommand(Command::new("endpoint").about("Print the resolved network and subgraph URL"))
        .subcommand(
            Command::new("query")
                .about("Run a GraphQL query and print its data")
                .arg(
                    Arg::new("document")
                        .help("GraphQL document, or - to read it from stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("variables")
                        .long("variables")
                        .value_name("JSON")
                        .help("Variables as a JSON object"),
                )
                .arg(
                    Arg::new("operation-name")
                        .long("operation-name")
                        .value_name("NAME")
                        .help("Operation to run when the document has several"),
                )
                .arg(
                    Arg::new("policy")
                        .long("policy")
                        .value_name("POLICY")
                        .help("cache-first, network-only, no-cache or cache-only.\nDefault: network-only"),
                ),
        )
}

fn build_config(matches: &ArgMatches) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match matches.get_one::<String>("network") {
        Some(raw) => ClientConfig::for_network(raw.parse::<Network>()?),
        None => ClientConfig::from_env(),
    };
    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        config = config.with_endpoint(endpoint.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ens_subgraph=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    // the one client for this process; everything below borrows it
    let client = SubgraphClient::new(build_config(&matches)?);

    match matches.subcommand() {
        Some(("endpoint", _)) => {
            println!("{} {}", client.network(), client.endpoint());
        }
        Some(("query", sub)) => {
            let document = match sub.get_one::<String>("document").map(String::as_str) {
                Some("-") | None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
                Some(doc) => doc.to_string(),
            };

            let mut request = GraphQlRequest::new(document);
            if let Some(vars) = sub.get_one::<String>("variables") {
                request = request.variables(serde_json::from_str(vars)?);
            }
            if let Some(name) = sub.get_one::<String>("operation-name") {
                request = request.operation_name(name.clone());
            }

            let policy = match sub.get_one::<String>("policy") {
                Some(raw) => raw.parse::<FetchPolicy>()?,
                None => client.default_options().query,
            };

            tracing::info!(network = %client.network(), %policy, "running query");
            match client.query_with_policy(request, policy).await {
                Ok(data) => println!("{}", serde_json::to_string_pretty(&data)?),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
