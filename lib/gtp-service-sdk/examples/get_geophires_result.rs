#![allow(dead_code)]

use gtp_service_sdk::{
    GeophiresParameters, GeophiresRequest, GtpServiceClientBuilder, GtpServiceError,
    ReservoirModel,
};
use serde::Deserialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    // Endpoint from GTP_SERVICE_ENDPOINT, login with GTP_SERVICE_USERNAME / GTP_SERVICE_PASSWORD
    let client = GtpServiceClientBuilder::from_env().build()?;

    let request = GeophiresRequest::new(
        GeophiresParameters::new()
            .with_reservoir_model(ReservoirModel::MultipleParallelFractures)
            .with_reservoir_depth(3)
            .with_number_of_segments(1)
            .with_gradient_1(50)
            .with_maximum_temperature(400),
    );

    let result = match client.get_geophires_result(&request).await {
        Ok(result) => result,
        Err(err) if err.is_timeout() => {
            println!("simulation did not finish in time, try a smaller model");
            return Ok(());
        }
        Err(GtpServiceError::Remote { message, .. }) => {
            println!("simulation rejected: {message}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let summary = result.deserialize::<Summary>()?;
    let production = summary.results.average_net_electricity_production;
    println!(
        "Average Net Electricity Production: {} {}",
        production.value, production.unit
    );

    Ok(())
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(rename = "SUMMARY OF RESULTS")]
    results: SummaryOfResults,
}

#[derive(Debug, Deserialize)]
struct SummaryOfResults {
    #[serde(rename = "Average Net Electricity Production")]
    average_net_electricity_production: Quantity,
}

#[derive(Debug, Deserialize)]
struct Quantity {
    value: f64,
    unit: String,
}
