use crate::command;
use argh::FromArgs;
use tequila_broker::client_registry::ClientRegistry;
use tracing::warn;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "clients",
    description = "List the clients known to the client registry"
)]
pub struct Options {
    #[argh(switch, short = 'v')]
    /// also print redirect URIs and extra ID token claims
    pub verbose: bool,
}

pub struct Command {
    registry: ClientRegistry,
    verbose: bool,
}

impl Command {
    pub fn new(options: &Options, registry: ClientRegistry) -> Self {
        Command {
            registry,
            verbose: options.verbose,
        }
    }

    pub async fn run(&self) -> Result<(), command::Error> {
        let snapshot = self.registry.refresh().await?;

        let mut client_ids = snapshot.clients.keys().collect::<Vec<_>>();
        client_ids.sort();

        for client_id in client_ids {
            let Some(record) = snapshot.clients.get(client_id) else {
                continue;
            };

            let requires = match record.policy() {
                Ok(formula) if formula.is_empty() => "-".to_string(),
                Ok(formula) => formula.to_string(),
                Err(e) => {
                    warn!("Client {client_id} has invalid requirements: {e}");
                    format!("invalid ({e})")
                }
            };
            println!("{client_id}\t{requires}");

            if self.verbose {
                for uri in &record.redirect_uris {
                    println!("\tredirect_uri: {uri}");
                }
                for claim in &record.extra_id_token_claims {
                    println!("\textra_id_token_claim: {claim}");
                }
            }
        }

        Ok(())
    }
}
