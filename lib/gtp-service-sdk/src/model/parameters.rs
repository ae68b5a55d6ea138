use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Geophires, HipRa, SimulationFamily};
use crate::GtpServiceError;

/// A single parameter value sent to the simulation service.
///
/// The service owns validation, so values are only restricted to the JSON
/// scalars it understands: strings, integers, floating-point numbers and
/// booleans. Integer-coded enumerations such as [`ReservoirModel`] convert
/// into [`ParameterValue::Integer`].
///
/// # Example
///
/// ```rust
/// use gtp_service_sdk::ParameterValue;
///
/// assert_eq!(ParameterValue::from(50), ParameterValue::Integer(50));
/// assert_eq!(ParameterValue::from(0.05), ParameterValue::Float(0.05));
/// assert_eq!(ParameterValue::from("1"), ParameterValue::Text("1".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A boolean flag.
    Boolean(bool),
    /// An integer, including integer-coded enumerations.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A string value.
    Text(String),
}

impl ParameterValue {
    /// Returns a short name of the JSON kind, used in error messages.
    fn json_kind(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&String> for ParameterValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u16> for ParameterValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u8> for ParameterValue {
    fn from(value: u8) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f32> for ParameterValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<ReservoirModel> for ParameterValue {
    fn from(value: ReservoirModel) -> Self {
        Self::Integer(value.code())
    }
}

/// Converts a dynamic JSON value, giving the value back when it is not a scalar.
impl TryFrom<serde_json::Value> for ParameterValue {
    type Error = serde_json::Value;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Bool(flag) => Ok(Self::Boolean(flag)),
            serde_json::Value::String(text) => Ok(Self::Text(text)),
            serde_json::Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Ok(Self::Integer(integer))
                } else if let Some(float) = number.as_f64() {
                    Ok(Self::Float(float))
                } else {
                    Err(serde_json::Value::Number(number))
                }
            }
            other => Err(other),
        }
    }
}

/// GEOPHIRES reservoir models, sent as their integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservoirModel {
    /// Multiple parallel fractures model (Gringarten).
    MultipleParallelFractures,
    /// One-dimensional linear heat sweep model.
    LinearHeatSweep,
    /// m/A single fracture thermal drawdown model.
    SingleFractureDrawdown,
    /// Linear thermal drawdown model.
    LinearThermalDrawdown,
    /// Generic user-provided temperature profile.
    UserProvidedTemperatureProfile,
    /// TOUGH2 reservoir simulator.
    Tough2,
    /// SUTRA reservoir simulator.
    Sutra,
}

impl ReservoirModel {
    /// Returns the integer code understood by GEOPHIRES.
    pub fn code(self) -> i64 {
        match self {
            Self::MultipleParallelFractures => 1,
            Self::LinearHeatSweep => 2,
            Self::SingleFractureDrawdown => 3,
            Self::LinearThermalDrawdown => 4,
            Self::UserProvidedTemperatureProfile => 5,
            Self::Tough2 => 6,
            Self::Sutra => 7,
        }
    }
}

/// Input parameters of a simulation family.
///
/// An insertion-ordered set of named [`ParameterValue`]s. Setting a name that
/// is already present replaces its value and keeps its original position.
/// No validation is performed: the remote service owns the parameter schema.
///
/// The named setters (e.g. [`with_gradient_1`](Parameters::with_gradient_1))
/// are shorthands for [`with_parameter`](Parameters::with_parameter) with a
/// fixed parameter name; they do no unit conversion.
///
/// # Example
///
/// ```rust
/// use gtp_service_sdk::{GeophiresParameters, ReservoirModel};
///
/// let parameters = GeophiresParameters::new()
///     .with_gradient_1(50)
///     .with_maximum_temperature(300)
///     .with_reservoir_model(ReservoirModel::MultipleParallelFractures)
///     .with_parameter("Gradient 1", 55);
///
/// assert_eq!(parameters.len(), 3);
/// assert_eq!(parameters.get("Gradient 1"), Some(&55.into()));
/// ```
pub struct Parameters<F> {
    values: IndexMap<String, ParameterValue>,
    family: PhantomData<F>,
}

/// GEOPHIRES input parameters.
pub type GeophiresParameters = Parameters<Geophires>;

/// HIP-RA input parameters.
pub type HipRaParameters = Parameters<HipRa>;

impl<F: SimulationFamily> Parameters<F> {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
            family: PhantomData,
        }
    }

    /// Sets a parameter, replacing any previous value with the same name.
    #[must_use]
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Self {
        self.set_parameter(name, value);
        self
    }

    /// Sets a parameter in place, replacing any previous value with the same name.
    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets a parameter from a dynamic JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`GtpServiceError::InvalidParameter`] when the value is not a
    /// string, number or boolean.
    pub fn try_with_json(
        self,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<Self, GtpServiceError> {
        let name = name.into();
        match ParameterValue::try_from(value) {
            Ok(value) => Ok(self.with_parameter(name, value)),
            Err(rejected) => Err(GtpServiceError::InvalidParameter {
                reason: format!(
                    "expected a string, number or boolean, got {}",
                    ParameterValue::json_kind(&rejected)
                ),
                name,
            }),
        }
    }

    /// Returns the underlying parameters, in insertion order.
    pub fn parameters(&self) -> &IndexMap<String, ParameterValue> {
        &self.values
    }

    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ParameterValue> {
        self.values.iter()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// GEOPHIRES shorthands
impl Parameters<Geophires> {
    /// Sets `Gradient 1`, the geothermal gradient of the first rock layer.
    #[must_use]
    pub fn with_gradient_1(self, gradient_1: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Gradient 1", gradient_1)
    }

    /// Sets `Maximum Temperature`.
    #[must_use]
    pub fn with_maximum_temperature(self, max_temp: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Maximum Temperature", max_temp)
    }

    /// Sets `Reservoir Model`, usually from a [`ReservoirModel`].
    #[must_use]
    pub fn with_reservoir_model(self, reservoir_model: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Model", reservoir_model)
    }

    /// Sets `Reservoir Depth`.
    #[must_use]
    pub fn with_reservoir_depth(self, depth: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Depth", depth)
    }

    /// Sets `Number of Segments`.
    #[must_use]
    pub fn with_number_of_segments(self, segments: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Number of Segments", segments)
    }

    /// Sets `End-Use Option`.
    #[must_use]
    pub fn with_end_use_option(self, end_use: impl Into<ParameterValue>) -> Self {
        self.with_parameter("End-Use Option", end_use)
    }

    /// Sets `Power Plant Type`.
    #[must_use]
    pub fn with_power_plant_type(self, plant_type: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Power Plant Type", plant_type)
    }

    /// Sets `Plant Lifetime`.
    #[must_use]
    pub fn with_plant_lifetime(self, lifetime: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Plant Lifetime", lifetime)
    }

    /// Sets `Number of Production Wells`.
    #[must_use]
    pub fn with_number_of_production_wells(self, wells: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Number of Production Wells", wells)
    }

    /// Sets `Number of Injection Wells`.
    #[must_use]
    pub fn with_number_of_injection_wells(self, wells: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Number of Injection Wells", wells)
    }
}

// HIP-RA shorthands
impl Parameters<HipRa> {
    /// Sets `Reservoir Temperature`.
    #[must_use]
    pub fn with_reservoir_temperature(self, temperature: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Temperature", temperature)
    }

    /// Sets `Rejection Temperature`.
    #[must_use]
    pub fn with_rejection_temperature(self, temperature: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Rejection Temperature", temperature)
    }

    /// Sets `Reservoir Porosity`.
    #[must_use]
    pub fn with_reservoir_porosity(self, porosity: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Porosity", porosity)
    }

    /// Sets `Reservoir Area`.
    #[must_use]
    pub fn with_reservoir_area(self, area: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Area", area)
    }

    /// Sets `Reservoir Thickness`.
    #[must_use]
    pub fn with_reservoir_thickness(self, thickness: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Thickness", thickness)
    }

    /// Sets `Reservoir Life Cycle`.
    #[must_use]
    pub fn with_reservoir_life_cycle(self, years: impl Into<ParameterValue>) -> Self {
        self.with_parameter("Reservoir Life Cycle", years)
    }
}

impl<F: SimulationFamily> Default for Parameters<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Clone for Parameters<F> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            family: PhantomData,
        }
    }
}

impl<F> PartialEq for Parameters<F> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<F: SimulationFamily> fmt::Debug for Parameters<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("family", &F::PATH_NAME)
            .field("values", &self.values)
            .finish()
    }
}

impl<F, K, V> FromIterator<(K, V)> for Parameters<F>
where
    F: SimulationFamily,
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (name, value)| {
                params.with_parameter(name, value)
            })
    }
}

impl<'a, F> IntoIterator for &'a Parameters<F> {
    type Item = (&'a String, &'a ParameterValue);
    type IntoIter = indexmap::map::Iter<'a, String, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<F> Serialize for Parameters<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}

impl<'de, F> Deserialize<'de> for Parameters<F> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IndexMap::deserialize(deserializer).map(|values| Self {
            values,
            family: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn should_keep_last_written_value() {
        let params = GeophiresParameters::new()
            .with_parameter("Gradient 1", 50)
            .with_parameter("Gradient 1", 55);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Gradient 1"), Some(&ParameterValue::Integer(55)));
    }

    #[test]
    fn should_preserve_first_seen_order() {
        let params = GeophiresParameters::new()
            .with_parameter("Reservoir Model", 1)
            .with_parameter("Gradient 1", 50)
            .with_parameter("Maximum Temperature", 300)
            .with_parameter("Reservoir Model", 3);

        let names: Vec<_> = params.parameters().keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["Reservoir Model", "Gradient 1", "Maximum Temperature"]
        );
        assert_eq!(
            params.get("Reservoir Model"),
            Some(&ParameterValue::Integer(3))
        );
    }

    #[test]
    fn should_mutate_in_place() {
        let mut params = HipRaParameters::new();
        params
            .set_parameter("Reservoir Temperature", 250)
            .set_parameter("Rejection Temperature", 60);

        assert_eq!(params.len(), 2);
    }

    #[rstest]
    #[case::gradient(
        GeophiresParameters::new().with_gradient_1(50),
        GeophiresParameters::new().with_parameter("Gradient 1", 50)
    )]
    #[case::max_temperature(
        GeophiresParameters::new().with_maximum_temperature(300),
        GeophiresParameters::new().with_parameter("Maximum Temperature", 300)
    )]
    #[case::reservoir_model(
        GeophiresParameters::new().with_reservoir_model(ReservoirModel::MultipleParallelFractures),
        GeophiresParameters::new().with_parameter("Reservoir Model", 1)
    )]
    #[case::reservoir_depth(
        GeophiresParameters::new().with_reservoir_depth(3.5),
        GeophiresParameters::new().with_parameter("Reservoir Depth", 3.5)
    )]
    #[case::end_use(
        GeophiresParameters::new().with_end_use_option(1),
        GeophiresParameters::new().with_parameter("End-Use Option", 1)
    )]
    #[case::production_wells(
        GeophiresParameters::new().with_number_of_production_wells(2),
        GeophiresParameters::new().with_parameter("Number of Production Wells", 2)
    )]
    fn should_match_generic_setter_for_geophires(
        #[case] shorthand: GeophiresParameters,
        #[case] generic: GeophiresParameters,
    ) {
        assert_eq!(shorthand, generic);
    }

    #[rstest]
    #[case::reservoir_temperature(
        HipRaParameters::new().with_reservoir_temperature(250),
        HipRaParameters::new().with_parameter("Reservoir Temperature", 250)
    )]
    #[case::porosity(
        HipRaParameters::new().with_reservoir_porosity(18.0),
        HipRaParameters::new().with_parameter("Reservoir Porosity", 18.0)
    )]
    #[case::life_cycle(
        HipRaParameters::new().with_reservoir_life_cycle(25),
        HipRaParameters::new().with_parameter("Reservoir Life Cycle", 25)
    )]
    fn should_match_generic_setter_for_hip_ra(
        #[case] shorthand: HipRaParameters,
        #[case] generic: HipRaParameters,
    ) {
        assert_eq!(shorthand, generic);
    }

    #[rstest]
    #[case::single_fracture(ReservoirModel::SingleFractureDrawdown, 3)]
    #[case::tough2(ReservoirModel::Tough2, 6)]
    #[case::sutra(ReservoirModel::Sutra, 7)]
    fn should_encode_reservoir_model_as_integer(
        #[case] model: ReservoirModel,
        #[case] expected: i64,
    ) {
        assert_eq!(ParameterValue::from(model), ParameterValue::Integer(expected));
    }

    #[test]
    fn should_serialize_as_json_object_in_order() {
        let params = GeophiresParameters::new()
            .with_gradient_1(50)
            .with_maximum_temperature(300.5)
            .with_parameter("Print Output to Console", true)
            .with_parameter("Well Geometry Configuration", "vertical");

        let json = serde_json::to_string(&params).expect("serialize parameters");
        assert_eq!(
            json,
            r#"{"Gradient 1":50,"Maximum Temperature":300.5,"Print Output to Console":true,"Well Geometry Configuration":"vertical"}"#
        );
    }

    #[test]
    fn should_deserialize_scalars() {
        let params: GeophiresParameters = serde_json::from_value(json!({
            "Gradient 1": 50,
            "Reservoir Depth": 3.5,
            "Print Output to Console": false,
            "Units": "km",
        }))
        .expect("deserialize parameters");

        assert_eq!(params.get("Gradient 1"), Some(&ParameterValue::Integer(50)));
        assert_eq!(params.get("Reservoir Depth"), Some(&ParameterValue::Float(3.5)));
        assert_eq!(
            params.get("Print Output to Console"),
            Some(&ParameterValue::Boolean(false))
        );
        assert_eq!(params.get("Units"), Some(&ParameterValue::from("km")));
    }

    #[rstest]
    #[case::integer(json!(42), ParameterValue::Integer(42))]
    #[case::float(json!(0.25), ParameterValue::Float(0.25))]
    #[case::boolean(json!(true), ParameterValue::Boolean(true))]
    #[case::text(json!("abc"), ParameterValue::Text("abc".to_string()))]
    fn should_accept_json_scalars(
        #[case] value: serde_json::Value,
        #[case] expected: ParameterValue,
    ) {
        let params = GeophiresParameters::new()
            .try_with_json("Some Parameter", value)
            .expect("scalar should be accepted");
        assert_eq!(params.get("Some Parameter"), Some(&expected));
    }

    #[rstest]
    #[case::null(json!(null), "null")]
    #[case::array(json!([1, 2]), "array")]
    #[case::object(json!({"a": 1}), "object")]
    fn should_reject_non_scalar_json(#[case] value: serde_json::Value, #[case] kind: &str) {
        let error = GeophiresParameters::new()
            .try_with_json("Some Parameter", value)
            .expect_err("non-scalar should be rejected");

        match error {
            GtpServiceError::InvalidParameter { name, reason } => {
                assert_eq!(name, "Some Parameter");
                assert!(reason.ends_with(kind), "unexpected reason: {reason}");
            }
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn should_collect_from_iterator() {
        let params: GeophiresParameters = [("Gradient 1", 50), ("Maximum Temperature", 300)]
            .into_iter()
            .collect();

        assert_eq!(
            params,
            GeophiresParameters::new()
                .with_gradient_1(50)
                .with_maximum_temperature(300)
        );
    }
}
