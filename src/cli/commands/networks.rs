use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_networks};
use crate::cli::OutputFormat;
use crate::handlers::tenant_networks::{NetworkList, NetworkShow};

#[derive(Subcommand)]
pub enum NetworksCommands {
    #[command(about = "List networks visible to the current project")]
    List,

    #[command(about = "Show a single network")]
    Show {
        #[arg(help = "Network id")]
        id: String,
    },
}

pub async fn handle(cmd: NetworksCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NetworksCommands::List => {
            let list: NetworkList = client.get(&["v2.1", "os-tenant-networks"]).await?;

            if list.networks.is_empty() {
                return output_empty_collection(&output_format, "networks", "No networks found");
            }
            output_networks(&output_format, &list.networks)
        }
        NetworksCommands::Show { id } => {
            let show: NetworkShow = client.get(&["v2.1", "os-tenant-networks", id.as_str()]).await?;
            output_networks(&output_format, std::slice::from_ref(&show.network))
        }
    }
}
