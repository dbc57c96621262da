//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, RequestArgs};
use crate::client::{AuthenticatedResponse, CasClient, RequestOptions};
use crate::config::{load_config, ConfigOverrides};
use crate::error::Result;
use reqwest::Method;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.build_client()?;

        match &self.cli.command {
            Commands::Connect => {
                let tgt = client.connect().await?;
                println!("{tgt}");
                Ok(())
            }
            Commands::Ticket { target } => {
                let ticket = client.service_ticket(target.as_deref()).await?;
                println!("{ticket}");
                Ok(())
            }
            Commands::Get(args) => self.request(&client, Method::GET, args).await,
            Commands::Post(args) => self.request(&client, Method::POST, args).await,
            Commands::Put(args) => self.request(&client, Method::PUT, args).await,
            Commands::Delete(args) => self.request(&client, Method::DELETE, args).await,
            Commands::Destroy => {
                if client.tgt().await.is_none() {
                    client.connect().await?;
                }
                client.destroy().await
            }
        }
    }

    /// Build the client from the config file and command-line overrides
    fn build_client(&self) -> Result<CasClient> {
        let config = load_config(&self.cli.config, self.cli.env.as_deref());
        debug!("Loaded CAS config from {}", self.cli.config.display());

        let mut overrides = ConfigOverrides::new();
        if let Some(uri) = &self.cli.uri {
            overrides = overrides.uri(uri);
        }
        if let Some(service) = &self.cli.service {
            overrides = overrides.service(service);
        }
        for (key, value) in &self.cli.payload {
            overrides = overrides.payload(key, value);
        }

        let mut builder = CasClient::builder().config(config).overrides(overrides);
        if let Some(tgt) = &self.cli.tgt {
            builder = builder.tgt(tgt);
        }
        builder.build()
    }

    /// Issue an authenticated request and print the response
    async fn request(&self, client: &CasClient, method: Method, args: &RequestArgs) -> Result<()> {
        let params: Vec<(&str, &str)> = args
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let options = args
            .headers
            .iter()
            .fold(RequestOptions::new(), |options, (k, v)| options.header(k, v));

        let response = client
            .request(method, &args.url, &params, &options)
            .await?;

        self.output_response(&response);
        Ok(())
    }

    /// Print a response: status line on stderr, body on stdout
    fn output_response(&self, response: &AuthenticatedResponse) {
        if self.cli.verbose {
            let via = if response.ticket().is_some() {
                "service ticket"
            } else {
                "session cookie"
            };
            eprintln!("HTTP {} (authenticated via {via})", response.status());
        } else {
            eprintln!("HTTP {}", response.status());
        }
        println!("{}", response.body());
    }
}
