// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Verb entry points shared by every domain helper.

use serde_json::Value;

use crate::error::{Result, RubrikError};
use crate::request::{ApiRequest, CallOptions, GraphqlQuery, QueryParams};

/// Capability interface over a Rubrik connection.
///
/// Implementors provide [`dispatch`](Self::dispatch),
/// [`record_function_name`](Self::record_function_name) and
/// [`job_status`](Self::job_status); the verb methods are built on top of
/// them. Each verb records `options.function_name` (or its own name) before
/// dispatching.
pub trait ApiClient {
    /// Validate, send and classify a single call.
    fn dispatch(&self, request: ApiRequest) -> Result<Value>;

    /// Store the name of the helper about to issue a call.
    fn record_function_name(&self, name: &str);

    /// Fetch a job-status URL, optionally polling until the job is finished.
    fn job_status(&self, url: &str, wait_for_completion: bool) -> Result<Value>;

    fn get(
        &self,
        api_version: &str,
        endpoint: &str,
        params: Option<QueryParams>,
        options: CallOptions,
    ) -> Result<Value> {
        self.record_function_name(options.function_name.as_deref().unwrap_or("get"));
        let mut request = ApiRequest::get(api_version, endpoint).with_options(&options);
        if let Some(params) = params {
            request = request.with_params(params);
        }
        self.dispatch(request)
    }

    fn post(
        &self,
        api_version: &str,
        endpoint: &str,
        body: Value,
        options: CallOptions,
    ) -> Result<Value> {
        self.record_function_name(options.function_name.as_deref().unwrap_or("post"));
        self.dispatch(ApiRequest::post(api_version, endpoint, body).with_options(&options))
    }

    fn put(
        &self,
        api_version: &str,
        endpoint: &str,
        body: Value,
        options: CallOptions,
    ) -> Result<Value> {
        self.record_function_name(options.function_name.as_deref().unwrap_or("put"));
        self.dispatch(ApiRequest::put(api_version, endpoint, body).with_options(&options))
    }

    fn patch(
        &self,
        api_version: &str,
        endpoint: &str,
        body: Value,
        options: CallOptions,
    ) -> Result<Value> {
        self.record_function_name(options.function_name.as_deref().unwrap_or("patch"));
        self.dispatch(ApiRequest::patch(api_version, endpoint, body).with_options(&options))
    }

    /// DELETE with either a JSON body or query parameters, never both.
    fn delete(
        &self,
        api_version: &str,
        endpoint: &str,
        body: Option<Value>,
        params: Option<QueryParams>,
        options: CallOptions,
    ) -> Result<Value> {
        if body.is_some() && params.is_some() {
            return Err(RubrikError::InvalidParameter(
                "delete accepts either a config body or params, not both".to_string(),
            ));
        }
        self.record_function_name(options.function_name.as_deref().unwrap_or("delete"));
        let mut request = ApiRequest::delete(api_version, endpoint).with_options(&options);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        if let Some(params) = params {
            request = request.with_params(params);
        }
        self.dispatch(request)
    }

    /// Run a GraphQL query; returns the `data` object of the response.
    fn query(&self, query: GraphqlQuery, options: CallOptions) -> Result<Value> {
        self.record_function_name(options.function_name.as_deref().unwrap_or("query"));
        self.dispatch(ApiRequest::query(query).with_options(&options))
    }
}
