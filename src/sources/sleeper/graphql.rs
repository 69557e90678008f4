//! Sleeper's private GraphQL endpoint
//!
//! The REST API only serves transactions one leg at a time; the GraphQL
//! endpoint returns a league's full history in one call but needs a
//! logged-in bearer token.

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::types::Transaction;
use crate::cli::types::LeagueId;
use crate::core::http::ensure_success;
use crate::{error::LakeError, Result};

pub const SLEEPER_GRAPHQL_URL: &str = "https://sleeper.com/graphql";

const LOGIN_QUERY: &str = r#"query login($email_or_phone_or_username: String!, $password: String!, $captcha: String) {
    login(email_or_phone_or_username: $email_or_phone_or_username, password: $password, captcha: $captcha) {
        token
    }
}"#;

const TRANSACTIONS_QUERY: &str = r#"query league_transactions_filtered($leagueId: String!) {
    league_transactions_filtered(
        league_id: $leagueId,
        roster_id_filters: [],
        type_filters: [],
        leg_filters: [],
        status_filters: ["complete"]) {
        adds
        consenter_ids
        created
        creator
        draft_picks
        drops
        league_id
        leg
        metadata
        roster_ids
        settings
        status
        status_updated
        transaction_id
        type
        player_map
        waiver_budget
    }
}"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct LoginData {
    login: Option<LoginToken>,
}

#[derive(Deserialize)]
struct LoginToken {
    token: String,
}

#[derive(Deserialize)]
struct TransactionsData {
    #[serde(default)]
    league_transactions_filtered: Vec<Transaction>,
}

#[derive(Debug, Clone)]
pub struct SleeperGraphQl {
    client: Client,
    url: String,
}

impl SleeperGraphQl {
    pub fn new(client: Client) -> Self {
        Self::with_url(client, SLEEPER_GRAPHQL_URL)
    }

    pub fn with_url(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
        auth: Option<&str>,
    ) -> Result<T> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        if let Some(auth) = auth {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(auth)?);
        }

        debug!(operation = operation_name, "GraphQL request");
        let request = GraphQlRequest {
            operation_name,
            query,
            variables,
        };
        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;
        let envelope: GraphQlResponse<T> = ensure_success(&self.url, response).await?.json().await?;

        if !envelope.errors.is_empty() {
            let message = envelope
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(LakeError::GraphQl { message });
        }
        envelope.data.ok_or_else(|| LakeError::GraphQl {
            message: format!("{operation_name} returned no data"),
        })
    }

    /// Log in and return a ready-to-use `Authorization` value.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let variables = json!({
            "email_or_phone_or_username": email,
            "password": password,
            "captcha": null,
        });
        let data: LoginData = self.execute("login", LOGIN_QUERY, variables, None).await?;
        let token = data.login.ok_or_else(|| LakeError::GraphQl {
            message: "login returned no token".to_string(),
        })?;
        Ok(format!("Bearer {}", token.token))
    }

    /// Every completed transaction in a league.
    pub async fn league_transactions(
        &self,
        league_id: &LeagueId,
        auth: &str,
    ) -> Result<Vec<Transaction>> {
        let variables = json!({ "leagueId": league_id.as_str() });
        let data: TransactionsData = self
            .execute(
                "league_transactions_filtered",
                TRANSACTIONS_QUERY,
                variables,
                Some(auth),
            )
            .await?;
        Ok(data.league_transactions_filtered)
    }
}
