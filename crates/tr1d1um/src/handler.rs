//! Request handling.
//!
//! [`ConversionHandler`] ties the pieces together: validate the addressed
//! device and service, build the WDMP command for the request method, wrap
//! it in a WRP envelope and deliver it through the retry strategy.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::Method;
use tokio_util::sync::CancellationToken;
use tr1d1um_config::Tr1d1umConfig;
use tr1d1um_convert::ConversionWdmp;
use tr1d1um_core::{Message, WdmpCommand};
use tr1d1um_extract::ExtractionContext;

use crate::error::{GatewayError, GatewayResult};
use crate::response::{handle_response, handle_whole_response, write_response, Tr1d1umResponse};
use crate::retry::{Attempt, IntervalRetry, RetryStrategy};
use crate::transport::{HttpSender, Sender};
use crate::validator::RequestValidator;

/// Translates HTTP requests into device round trips.
#[derive(Clone)]
pub struct ConversionHandler {
    conversion: ConversionWdmp,
    validator: RequestValidator,
    sender: Arc<dyn Sender>,
    retry: Arc<dyn RetryStrategy>,
}

impl ConversionHandler {
    /// Create a handler from its parts.
    pub fn new(
        conversion: ConversionWdmp,
        validator: RequestValidator,
        sender: Arc<dyn Sender>,
        retry: Arc<dyn RetryStrategy>,
    ) -> Self {
        Self {
            conversion,
            validator,
            sender,
            retry,
        }
    }

    /// Create a handler backed by [`HttpSender`] and [`IntervalRetry`].
    pub fn from_config(config: &Tr1d1umConfig) -> GatewayResult<Self> {
        config.validate()?;

        let conversion = ConversionWdmp::new(&config.gateway.wrp_source).with_read_keys(
            &config.read.names_key,
            &config.read.attributes_key,
            &config.read.names_separator,
        );
        let sender = HttpSender::from_config(&config.gateway)?;

        Ok(Self::new(
            conversion,
            RequestValidator::from_config(&config.gateway),
            Arc::new(sender),
            Arc::new(IntervalRetry::from_config(&config.gateway)),
        ))
    }

    /// Handles a device request.
    ///
    /// `GET` reads, `PATCH` writes, `DELETE` deletes a row, `PUT` replaces
    /// the rows of a table and `POST` adds a row. Rejected requests get a
    /// `{"message": ...}` body with the error's status.
    pub async fn handle(
        &self,
        ctx: &ExtractionContext,
        cancel: &CancellationToken,
    ) -> Tr1d1umResponse {
        let message = match self.prepare(ctx) {
            Ok(message) => message,
            Err(error) => return reject(&error),
        };

        let attempt = SendAttempt {
            sender: self.sender.as_ref(),
            message: &message,
        };
        self.retry.execute(&attempt, cancel).await
    }

    /// Handles a stat request, passing the transport reply through.
    ///
    /// Only the device id is checked. The caller's `Authorization` header
    /// is forwarded.
    pub async fn handle_stat(
        &self,
        ctx: &ExtractionContext,
        cancel: &CancellationToken,
    ) -> Tr1d1umResponse {
        let device = match self.validator.validate_device(ctx) {
            Ok(device) => device,
            Err(error) => return reject(&error),
        };

        tracing::debug!(device_id = %device, "fetching device stat");

        let attempt = StatAttempt {
            sender: self.sender.as_ref(),
            device_id: device.as_str(),
            authorization: ctx.non_empty_header(AUTHORIZATION.as_str()),
        };
        self.retry.execute(&attempt, cancel).await
    }

    /// Builds the command for the request method.
    pub fn command(&self, ctx: &ExtractionContext) -> GatewayResult<WdmpCommand> {
        let vars = ctx.path_vars();

        let command = match ctx.method() {
            &Method::GET => WdmpCommand::Read(self.conversion.read_command(ctx)?),
            &Method::PATCH => WdmpCommand::Write(self.conversion.write_command(ctx)?),
            &Method::DELETE => WdmpCommand::DeleteRow(self.conversion.delete_row_command(vars)?),
            &Method::PUT => {
                WdmpCommand::ReplaceRows(self.conversion.replace_rows_command(vars, ctx.body())?)
            }
            &Method::POST => WdmpCommand::AddRow(self.conversion.add_row_command(vars, ctx.body())?),
            method => {
                return Err(GatewayError::MethodNotAllowed {
                    method: method.to_string(),
                })
            }
        };
        Ok(command)
    }

    fn prepare(&self, ctx: &ExtractionContext) -> GatewayResult<Message> {
        let device = self.validator.validate(ctx)?;
        let command = self.command(ctx)?;
        let payload = command.to_payload()?;

        let message = self
            .conversion
            .configured_wrp(payload, ctx.path_vars(), ctx.headers());

        tracing::debug!(
            device_id = %device,
            command = command.command().as_str(),
            transaction_id = %message.transaction_uuid,
            "built WRP message"
        );
        Ok(message)
    }
}

impl std::fmt::Debug for ConversionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionHandler")
            .field("conversion", &self.conversion)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

fn reject(error: &GatewayError) -> Tr1d1umResponse {
    tracing::info!(
        error = %error,
        error_code = error.error_code(),
        "rejecting request"
    );
    let mut resp = Tr1d1umResponse::new();
    write_response(&error.response_message(), error.status_code(), &mut resp);
    resp
}

struct SendAttempt<'a> {
    sender: &'a dyn Sender,
    message: &'a Message,
}

#[async_trait]
impl<'a> Attempt for SendAttempt<'a> {
    async fn run(&self) -> Result<Tr1d1umResponse, GatewayError> {
        match self.sender.send(self.message).await {
            Err(error) if error.is_internal() => Err(error.into()),
            result => Ok(handle_response(result)),
        }
    }
}

struct StatAttempt<'a> {
    sender: &'a dyn Sender,
    device_id: &'a str,
    authorization: Option<&'a str>,
}

#[async_trait]
impl<'a> Attempt for StatAttempt<'a> {
    async fn run(&self) -> Result<Tr1d1umResponse, GatewayError> {
        match self
            .sender
            .get_stat(self.device_id, self.authorization)
            .await
        {
            Err(error) if error.is_internal() => Err(error.into()),
            result => Ok(handle_whole_response(result)),
        }
    }
}
