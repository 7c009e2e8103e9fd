use crate::command;
use argh::FromArgs;
use tequila_broker::configuration::Configuration;
use tequila_broker::tequila::{LoginBackend, TequilaBackend};

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "fetch-attributes",
    description = "Redeem a Tequila key and print the authenticated user as JSON"
)]
pub struct Options {
    #[argh(positional)]
    /// the key Tequila appended to the return URL
    pub key: String,
}

pub struct Command {
    backend: TequilaBackend,
    key: String,
}

impl Command {
    pub fn new(options: &Options, config: &Configuration) -> Result<Self, command::Error> {
        Ok(Command {
            backend: TequilaBackend::new(&config.base_url, &config.tequila)?,
            key: options.key.clone(),
        })
    }

    pub async fn run(&self) -> Result<(), command::Error> {
        let user = self.backend.handle_callback(&self.key).await?;

        println!("{}", serde_json::to_string_pretty(&user)?);
        Ok(())
    }
}
