//! Provides a [`NormalizeLayer`] that normalizes operations before they reach the executor and
//! rehydrates the responses on the way back.

use std::task::Poll;

use futures::FutureExt;
use futures::TryFutureExt;
use futures::future;
use futures::future::BoxFuture;
use tower::BoxError;
use tower::Layer;
use tower::Service;

use crate::graphql;
use crate::normalize::NormalizedQuery;
use crate::normalize::Normalizer;
use crate::rehydrate::rehydrate;

/// [`Layer`] normalizing GraphQL requests.
#[derive(Clone, Debug, Default)]
pub struct NormalizeLayer {
    normalizer: Normalizer,
}

impl NormalizeLayer {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }
}

impl<S> Layer<S> for NormalizeLayer {
    type Service = NormalizeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        NormalizeService {
            inner,
            normalizer: self.normalizer.clone(),
        }
    }
}

/// [`Service`] normalizing GraphQL requests. See [`NormalizeLayer`].
#[derive(Clone, Debug)]
pub struct NormalizeService<S> {
    inner: S,
    normalizer: Normalizer,
}

impl<S> Service<graphql::Request> for NormalizeService<S>
where
    S: Service<graphql::Request, Response = graphql::Response> + Send,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = graphql::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, mut request: graphql::Request) -> Self::Future {
        let Some(query) = request.query.take() else {
            // Nothing to normalize, e.g. a persisted query sent by hash only.
            return self.inner.call(request).err_into().boxed();
        };

        let variables = std::mem::take(&mut request.variables);
        let NormalizedQuery {
            query,
            variables,
            field_alias_map,
            ..
        } = match self.normalizer.normalize(&query, Some(variables)) {
            Ok(normalized) => normalized,
            Err(error) => {
                tracing::debug!(%error, "cannot normalize the operation");
                let response = graphql::Response::builder()
                    .error(error.to_graphql_error())
                    .build();
                return future::ready(Ok(response)).boxed();
            }
        };

        request.query = Some(query);
        request.variables = variables.unwrap_or_default();
        self.inner
            .call(request)
            .err_into()
            .map_ok(move |mut response: graphql::Response| {
                response.data = rehydrate(Some(&field_alias_map), response.data.take());
                response
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use apollo_compiler::ast;
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;
    use test_log::test;
    use tower::ServiceBuilder;
    use tower::ServiceExt;
    use tower::service_fn;

    use super::*;
    use crate::configuration::Configuration;
    use crate::configuration::UnregisteredVariables;

    fn request(query: &str, variables: serde_json_bytes::Value) -> graphql::Request {
        graphql::Request::builder()
            .query(query)
            .variables(variables.as_object().cloned().unwrap_or_default())
            .build()
    }

    #[test(tokio::test)]
    async fn executes_normalized_requests_and_rehydrates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let executor = {
            let seen = seen.clone();
            service_fn(move |request: graphql::Request| {
                seen.lock().unwrap().push(request.clone());
                async move {
                    Ok::<_, BoxError>(
                        graphql::Response::builder()
                            .data(json!({ "echo": { "a": "1" }, "echo1": { "a": "2" } }))
                            .build(),
                    )
                }
            })
        };

        let response = ServiceBuilder::new()
            .layer(NormalizeLayer::default())
            .service(executor)
            .oneshot(request(
                "query($x: String, $y: String) { first: echo(input: { a: $x }) { a } second: echo(input: { a: $y }) { a } }",
                json!({ "x": "1", "y": "2" }),
            ))
            .await
            .unwrap();

        assert_eq!(
            response.data,
            Some(json!({ "first": { "a": "1" }, "second": { "a": "2" } }))
        );
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].query.as_deref(),
            Some(
                ast::Document::parse(
                    "query echo($a: String, $a1: String) { echo(input: { a: $a }) { a } echo1: echo(input: { a: $a1 }) { a } }",
                    "query.graphql"
                )
                .unwrap()
                .to_string()
                .as_str()
            )
        );
        assert_eq!(
            seen[0].variables,
            json!({ "a": "1", "a1": "2" }).as_object().cloned().unwrap()
        );
    }

    #[test(tokio::test)]
    async fn requests_without_query_pass_through() {
        let executor = service_fn(|request: graphql::Request| async move {
            assert_eq!(request.query, None);
            assert_eq!(request.variables.get("id"), Some(&json!("1")));
            Ok::<_, BoxError>(graphql::Response::builder().data(json!({ "a1": 1 })).build())
        });

        let response = NormalizeLayer::default()
            .layer(executor)
            .oneshot(
                graphql::Request::builder()
                    .variable("id", json!("1"))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(response.data, Some(json!({ "a1": 1 })));
    }

    #[test(tokio::test)]
    async fn normalization_errors_become_graphql_errors() {
        let executor = service_fn(|_request: graphql::Request| async move {
            Err::<graphql::Response, BoxError>("the executor must not be called".into())
        });
        let layer = NormalizeLayer::new(Normalizer::new(Configuration {
            unregistered_variables: UnregisteredVariables::Reject,
            ..Default::default()
        }));
        let mut service = layer.layer(executor);

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request("{ echo(", json!({})))
            .await
            .unwrap();
        assert_eq!(response.data, None);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].extension_code().as_deref(), Some("PARSING_ERROR"));

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request("query($v: ID) { nodes(ids: [$v]) { id } }", json!({ "v": "1" })))
            .await
            .unwrap();
        assert_eq!(
            response.errors[0].extension_code().as_deref(),
            Some("UNREGISTERED_VARIABLE")
        );
        assert_eq!(response.errors[0].message, "variable '$v' is not bound to any argument");
    }

    #[test(tokio::test)]
    async fn executor_errors_are_propagated() {
        let executor = service_fn(|_request: graphql::Request| async move {
            Err::<graphql::Response, BoxError>("executor failed".into())
        });
        let error = NormalizeLayer::default()
            .layer(executor)
            .oneshot(request("{ a }", json!({})))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "executor failed");
    }
}
