use crate::command;
use argh::FromArgs;
use tequila_broker::configuration::Configuration;
use tequila_broker::tequila::{LoginBackend, TequilaBackend};
use tracing::info;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "login",
    description = "Create a Tequila request and print the URL to send the user to"
)]
pub struct Options {
    #[argh(positional)]
    /// service name shown to the user on the Tequila login page
    pub requester: String,
}

pub struct Command {
    backend: TequilaBackend,
    requester: String,
}

impl Command {
    pub fn new(options: &Options, config: &Configuration) -> Result<Self, command::Error> {
        Ok(Command {
            backend: TequilaBackend::new(&config.base_url, &config.tequila)?,
            requester: options.requester.clone(),
        })
    }

    pub async fn run(&self) -> Result<(), command::Error> {
        let target = self.backend.start_login(&self.requester).await?;
        info!(
            "Tequila will redirect back to {}?key=<key>",
            self.backend.return_url()
        );

        println!("{target}");
        Ok(())
    }
}
