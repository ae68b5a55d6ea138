use gtp_service_sdk::blocking::GtpServiceClient;
use gtp_service_sdk::{
    DescribeResultsRequest, GtpServiceClientBuilder, HipRaParameters, HipRaRequest, SharePolicy,
    UpdateResultRequest,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let client = GtpServiceClient::new(GtpServiceClientBuilder::from_env())?;

    let request = HipRaRequest::new(
        HipRaParameters::new()
            .with_reservoir_temperature(250.0)
            .with_rejection_temperature(60.0)
            .with_reservoir_porosity(10.0)
            .with_reservoir_area(55.0)
            .with_reservoir_thickness(0.25)
            .with_reservoir_life_cycle(25),
    );
    let hip_ra = client.get_hip_ra_result(&request)?;
    println!("{:#}", hip_ra.hip_ra_result());

    // Share every stored GEOPHIRES result
    for result in client.describe_geophires_results(&DescribeResultsRequest::all())? {
        let result_id = result.result_id()?;
        let update = UpdateResultRequest::new(result_id).with_share_policy(SharePolicy::Public);
        client.update_geophires_result(&update)?;
        println!("shared {result_id}");
    }

    Ok(())
}
