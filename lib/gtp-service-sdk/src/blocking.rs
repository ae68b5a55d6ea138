//! Blocking client of the GTP simulation service.
//!
//! [`GtpServiceClient`] wraps the async [`crate::GtpServiceClient`] with a
//! current-thread tokio runtime. Do not use it from within an async runtime.
//!
//! ```rust,no_run
//! use gtp_service_sdk::{HipRaParameters, HipRaRequest};
//! use gtp_service_sdk::blocking::GtpServiceClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GtpServiceClient::new(
//!     gtp_service_sdk::GtpServiceClient::builder()
//!         .with_endpoint("https://gtp.example.com")
//!         .with_bearer_token("my-access-token"),
//! )?;
//!
//! let request = HipRaRequest::new(
//!     HipRaParameters::new()
//!         .with_reservoir_temperature(250.0)
//!         .with_rejection_temperature(60.0),
//! );
//! let result = client.get_hip_ra_result(&request)?;
//! println!("{}", result.hip_ra_result());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use tokio::runtime::{Builder, Runtime};

use crate::{
    DescribeResultsRequest, GeophiresRequest, GeophiresResult, GtpServiceClientBuilder,
    GtpServiceError, HipRaRequest, HipRaResult, ResultIdRequest, UpdateResultRequest,
};

/// Blocking counterpart of [`crate::GtpServiceClient`].
pub struct GtpServiceClient {
    inner: crate::GtpServiceClient,
    runtime: Runtime,
}

impl GtpServiceClient {
    /// Builds the async client and the runtime driving it.
    ///
    /// # Errors
    ///
    /// Returns [`GtpServiceError::Configuration`] if the builder is invalid or
    /// if the runtime cannot be created.
    pub fn new(builder: GtpServiceClientBuilder) -> Result<Self, GtpServiceError> {
        Self::from_async(builder.build()?)
    }

    /// Wraps an existing async client.
    ///
    /// # Errors
    ///
    /// Returns [`GtpServiceError::Configuration`] if the runtime cannot be
    /// created.
    pub fn from_async(inner: crate::GtpServiceClient) -> Result<Self, GtpServiceError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| GtpServiceError::Configuration {
                reason: format!("cannot start the blocking runtime: {err}"),
            })?;

        Ok(Self { inner, runtime })
    }

    /// Returns the wrapped async client.
    pub fn as_async(&self) -> &crate::GtpServiceClient {
        &self.inner
    }

    /// Runs a GEOPHIRES simulation.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::get_geophires_result`].
    pub fn get_geophires_result(
        &self,
        request: &GeophiresRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.runtime.block_on(self.inner.get_geophires_result(request))
    }

    /// Runs a HIP-RA analysis.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::get_hip_ra_result`].
    pub fn get_hip_ra_result(
        &self,
        request: &HipRaRequest,
    ) -> Result<HipRaResult, GtpServiceError> {
        self.runtime.block_on(self.inner.get_hip_ra_result(request))
    }

    /// Runs a GEOPHIRES simulation and stores its result.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::create_geophires_result`].
    pub fn create_geophires_result(
        &self,
        request: &GeophiresRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.runtime.block_on(self.inner.create_geophires_result(request))
    }

    /// Lists stored GEOPHIRES results.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::describe_geophires_results`].
    pub fn describe_geophires_results(
        &self,
        request: &DescribeResultsRequest,
    ) -> Result<Vec<GeophiresResult>, GtpServiceError> {
        self.runtime.block_on(self.inner.describe_geophires_results(request))
    }

    /// Fetches a shared GEOPHIRES result.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::get_shared_geophires_result`].
    pub fn get_shared_geophires_result(
        &self,
        request: &ResultIdRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.runtime.block_on(self.inner.get_shared_geophires_result(request))
    }

    /// Updates a stored GEOPHIRES result.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::update_geophires_result`].
    pub fn update_geophires_result(
        &self,
        request: &UpdateResultRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.runtime.block_on(self.inner.update_geophires_result(request))
    }

    /// Deletes a stored GEOPHIRES result.
    ///
    /// # Errors
    ///
    /// See [`crate::GtpServiceClient::delete_geophires_result`].
    pub fn delete_geophires_result(
        &self,
        request: &ResultIdRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.runtime.block_on(self.inner.delete_geophires_result(request))
    }
}

impl fmt::Debug for GtpServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GtpServiceClient")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
