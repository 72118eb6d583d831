use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use smartroute_providers::{
    geocoding::Geocoder,
    track_asia_api::{TrackAsiaClient, TrackAsiaClientParams},
};
use tracing::warn;

use crate::geocoder::build_geocoder;

#[derive(Args)]
pub struct GeocodeArgs {
    /// Addresses to look up
    #[arg(required = true)]
    addresses: Vec<String>,
}

pub async fn run(args: GeocodeArgs) -> Result<(), anyhow::Error> {
    let client = TrackAsiaClient::new(TrackAsiaClientParams::from_env()?);
    let geocoder = build_geocoder(client);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Address", "Latitude", "Longitude"]);

    for address in args.addresses {
        match geocoder.geocode(&address).await {
            Ok(Some(point)) => {
                table.add_row(vec![
                    address,
                    format!("{:.6}", point.y()),
                    format!("{:.6}", point.x()),
                ]);
            }
            Ok(None) => {
                table.add_row(vec![address, String::from("not found"), String::new()]);
            }
            Err(error) => {
                warn!("Failed to geocode {:?}: {}", address, error);
                table.add_row(vec![address, String::from("error"), String::new()]);
            }
        }
    }

    println!("{table}");

    Ok(())
}
