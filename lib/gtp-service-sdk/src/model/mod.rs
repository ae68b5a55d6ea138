use std::fmt::Debug;

mod parameters;
pub use self::parameters::{
    GeophiresParameters, HipRaParameters, ParameterValue, Parameters, ReservoirModel,
};

mod request;
pub use self::request::{
    DescribeResultsRequest, GeophiresRequest, HipRaRequest, ResultIdRequest, SharePolicy,
    SimulationRequest, UpdateResultRequest,
};

mod result;
pub use self::result::{GeophiresResult, HipRaResult, SimulationResult};

/// A simulation family exposed by the GTP service.
///
/// Families are zero-sized marker types: they select the endpoint names and
/// the request body key, and keep GEOPHIRES and HIP-RA parameters, requests
/// and results from being mixed up at compile time.
pub trait SimulationFamily: Debug + Clone + Copy + Default + PartialEq + Send + Sync + 'static {
    /// Name used in endpoint paths, e.g. `geophires` in `get-geophires-result`.
    const PATH_NAME: &'static str;

    /// Key wrapping the input parameters in request bodies.
    const INPUT_KEY: &'static str;
}

/// GEOPHIRES, the primary simulation family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Geophires;

impl SimulationFamily for Geophires {
    const PATH_NAME: &'static str = "geophires";
    const INPUT_KEY: &'static str = "geophires_input_parameters";
}

/// HIP-RA (heat-in-place resource assessment), the secondary analysis family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HipRa;

impl SimulationFamily for HipRa {
    const PATH_NAME: &'static str = "hip-ra";
    const INPUT_KEY: &'static str = "hip_ra_input_parameters";
}
