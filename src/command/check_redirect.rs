use crate::command;
use argh::FromArgs;
use tequila_broker::client_registry::ClientRegistry;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "check-redirect",
    description = "Check a redirect URI against the ones registered for a client"
)]
pub struct Options {
    #[argh(positional)]
    /// the client id
    pub client_id: String,
    #[argh(positional)]
    /// the redirect URI to check
    pub redirect_uri: String,
}

pub struct Command {
    registry: ClientRegistry,
    client_id: String,
    redirect_uri: String,
}

impl Command {
    pub fn new(options: &Options, registry: ClientRegistry) -> Self {
        Command {
            registry,
            client_id: options.client_id.clone(),
            redirect_uri: options.redirect_uri.clone(),
        }
    }

    pub async fn run(&self) -> Result<(), command::Error> {
        if !self
            .registry
            .is_redirect_uri_allowed(&self.client_id, &self.redirect_uri)
            .await?
        {
            return Err(command::Error::RedirectNotAllowed(self.redirect_uri.clone()));
        }

        println!("allowed");
        Ok(())
    }
}
