use crate::command;
use argh::FromArgs;
use tequila_broker::client_registry::{ClientRegistry, RequireCheck};
use tequila_broker::configuration::Configuration;
use tequila_broker::tequila::AttributeSet;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "authorize",
    description = "Check whether a user with the given groups may log into a client"
)]
pub struct Options {
    #[argh(positional)]
    /// the client id
    pub client_id: String,
    #[argh(option, short = 'g')]
    /// a group of the user, can be repeated
    pub group: Vec<String>,
}

pub struct Command {
    registry: ClientRegistry,
    check: RequireCheck,
    backend_name: String,
    client_id: String,
    attributes: AttributeSet,
}

impl Command {
    pub fn new(options: &Options, config: &Configuration, registry: ClientRegistry) -> Self {
        let mut attributes = AttributeSet::new();
        if !options.group.is_empty() {
            attributes.insert(
                config.tequila.groups_attribute.clone(),
                options.group.clone(),
            );
        }

        Command {
            registry,
            check: RequireCheck::new(&config.tequila),
            backend_name: config.tequila.backend_name.clone(),
            client_id: options.client_id.clone(),
            attributes,
        }
    }

    pub async fn run(&self) -> Result<(), command::Error> {
        self.check
            .check(
                &self.registry,
                &self.backend_name,
                &self.client_id,
                &self.attributes,
            )
            .await?;

        println!("allowed");
        Ok(())
    }
}
