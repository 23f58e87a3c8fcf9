//! Action resource handlers.
//!
//! Every handler runs the same pipeline, stopping at the first failure:
//!
//! 1. `TouchpointId` header (and `apimurl` on create), else 400
//! 2. path GUIDs, else 400
//! 3. body parse, else 422 (create and update only)
//! 4. server-side stamping and validation, else 422 with findings
//! 5. ancestor chain, else 204
//! 6. read-only customer check, else 403 (create only)
//! 7. storage, then a background change notification on success
//!
//! A missing record, or a store that fails to read, answers 204.

use super::Outcome;
use crate::error::AppError;
use crate::extractors::{ApiUrl, ResourceBaseUrl, TouchpointId};
use crate::notify::publish_in_background;
use crate::openapi::{BodySchema, Method, ResponseSpec, RouteSpec, SchemaNode};
use crate::state::AppState;
use actions_core::environment::Clock;
use actions_core::validation::{
    ACTION_SUMMARY_MAX_LENGTH, SIGNPOSTED_TO_MAX_LENGTH, TOUCHPOINT_ID_LENGTH,
};
use actions_core::{
    Action, ActionFields, ActionId, ActionPatch, ActionPath, ActionStatus, ActionType,
    ChangeMessage, PersonResponsible, SignpostedToCategory, StoreError, patch, verify_ancestors,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
};
use serde::de::DeserializeOwned;
use std::str::FromStr;

/// Collection route template.
pub const COLLECTION_PATH: &str = "/api/Customers/{customerId}/Interactions/{interactionId}/ActionPlans/{actionPlanId}/Actions";

/// Item route template.
pub const ITEM_PATH: &str = "/api/Customers/{customerId}/Interactions/{interactionId}/ActionPlans/{actionPlanId}/Actions/{actionId}";

fn parse_id<T: FromStr>(raw: &str, name: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| {
        tracing::info!(parameter = name, value = raw, "Request rejected: malformed GUID");
        AppError::bad_request(format!("Unable to parse '{name}' to a Guid: {raw}"))
    })
}

fn action_path(customer_id: &str, interaction_id: &str, action_plan_id: &str) -> Result<ActionPath, AppError> {
    Ok(ActionPath {
        customer_id: parse_id(customer_id, "customerId")?,
        interaction_id: parse_id(interaction_id, "interactionId")?,
        action_plan_id: parse_id(action_plan_id, "actionPlanId")?,
    })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    match serde_json::from_slice::<Option<T>>(body) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(AppError::unprocessable("Action body is required")),
        Err(e) => Err(AppError::unprocessable(format!("Unable to read Action body: {e}"))),
    }
}

fn ensure_valid<R: ActionFields>(state: &AppState, resource: &R, is_create: bool) -> Result<(), AppError> {
    let findings = state.validator.validate(resource, is_create);
    if findings.is_empty() {
        return Ok(());
    }
    tracing::info!(findings = findings.len(), "Request rejected: validation failed");
    metrics::counter!("actions_validation_failures_total").increment(1);
    Err(AppError::validation(findings))
}

async fn ancestors_present(state: &AppState, path: &ActionPath) -> bool {
    match verify_ancestors(state.ancestors.as_ref(), path).await {
        Ok(()) => true,
        Err(missing) => {
            tracing::info!(customer_id = %path.customer_id, "{missing}");
            metrics::counter!("actions_ancestor_missing_total", "ancestor" => missing.as_str())
                .increment(1);
            false
        },
    }
}

fn store_failure(message: String, error: StoreError) -> AppError {
    AppError::bad_request(message).with_source(anyhow::Error::new(error))
}

/// List every action under an action plan.
///
/// ```text
/// GET /api/Customers/{customerId}/Interactions/{interactionId}/ActionPlans/{actionPlanId}/Actions
/// ```
///
/// # Errors
///
/// 400 for a missing touchpoint or a malformed GUID.
pub async fn list_actions(
    State(state): State<AppState>,
    _touchpoint: TouchpointId,
    Path((customer_id, interaction_id, action_plan_id)): Path<(String, String, String)>,
) -> Result<Outcome<Vec<Action>>, AppError> {
    let path = action_path(&customer_id, &interaction_id, &action_plan_id)?;

    if !ancestors_present(&state, &path).await {
        return Ok(Outcome::NoContent);
    }

    let actions = state
        .store
        .list_actions(path.customer_id, path.action_plan_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, customer_id = %path.customer_id, "Failed to list actions");
            Vec::new()
        });

    if actions.is_empty() {
        Ok(Outcome::NoContent)
    } else {
        Ok(Outcome::Ok(actions))
    }
}

/// Fetch one action.
///
/// ```text
/// GET /api/Customers/{customerId}/Interactions/{interactionId}/ActionPlans/{actionPlanId}/Actions/{actionId}
/// ```
///
/// # Errors
///
/// 400 for a missing touchpoint or a malformed GUID.
pub async fn get_action(
    State(state): State<AppState>,
    _touchpoint: TouchpointId,
    Path((customer_id, interaction_id, action_plan_id, action_id)): Path<(
        String,
        String,
        String,
        String,
    )>,
) -> Result<Outcome<Action>, AppError> {
    let path = action_path(&customer_id, &interaction_id, &action_plan_id)?;
    let action_id: ActionId = parse_id(&action_id, "actionId")?;

    if !ancestors_present(&state, &path).await {
        return Ok(Outcome::NoContent);
    }

    match state
        .store
        .get_action(path.customer_id, path.action_plan_id, action_id)
        .await
    {
        Ok(Some(action)) => Ok(Outcome::Ok(action)),
        Ok(None) => Ok(Outcome::NoContent),
        Err(e) => {
            tracing::warn!(error = %e, action_id = %action_id, "Failed to read action");
            Ok(Outcome::NoContent)
        },
    }
}

/// Create an action under an action plan.
///
/// ```text
/// POST /api/Customers/{customerId}/Interactions/{interactionId}/ActionPlans/{actionPlanId}/Actions
/// ```
///
/// # Errors
///
/// - 400 for missing headers, a malformed GUID or a store failure
/// - 403 when the customer is read-only
/// - 422 for an unreadable body or validation findings
pub async fn create_action(
    State(state): State<AppState>,
    TouchpointId(touchpoint): TouchpointId,
    ApiUrl(api_url): ApiUrl,
    Path((customer_id, interaction_id, action_plan_id)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<Outcome<Action>, AppError> {
    let path = action_path(&customer_id, &interaction_id, &action_plan_id)?;
    let mut action: Action = parse_body(&body)?;

    let action_id = action.stamp_for_create(&path, &touchpoint, state.clock.now());
    ensure_valid(&state, &action, true)?;

    if !ancestors_present(&state, &path).await {
        return Ok(Outcome::NoContent);
    }

    if state.ancestors.is_customer_read_only(path.customer_id).await {
        tracing::info!(customer_id = %path.customer_id, "Request rejected: customer is read only");
        return Err(AppError::forbidden(format!(
            "Customer {} is read only",
            path.customer_id
        )));
    }

    let created = state.store.create_action(&action).await.map_err(|e| {
        store_failure(
            format!("Failed to create action for customer {}", path.customer_id),
            e,
        )
    })?;

    metrics::counter!("actions_created_total").increment(1);
    tracing::info!(action_id = %action_id, customer_id = %path.customer_id, "Action created");

    publish_in_background(
        state.notifications.clone(),
        ChangeMessage::created(&path, action_id, created.last_modified_date, &touchpoint, &api_url),
    );

    Ok(Outcome::Created(created))
}

/// Merge a sparse update into an existing action.
///
/// ```text
/// PATCH /api/Customers/{customerId}/Interactions/{interactionId}/ActionPlans/{actionPlanId}/Actions/{actionId}
/// ```
///
/// # Errors
///
/// - 400 for a missing touchpoint, a malformed GUID or a failed merge or write
/// - 422 for an unreadable body or validation findings
pub async fn update_action(
    State(state): State<AppState>,
    TouchpointId(touchpoint): TouchpointId,
    ResourceBaseUrl(base_url): ResourceBaseUrl,
    Path((customer_id, interaction_id, action_plan_id, action_id)): Path<(
        String,
        String,
        String,
        String,
    )>,
    body: Bytes,
) -> Result<Outcome<Action>, AppError> {
    let path = action_path(&customer_id, &interaction_id, &action_plan_id)?;
    let action_id: ActionId = parse_id(&action_id, "actionId")?;
    let mut update: ActionPatch = parse_body(&body)?;

    update.stamp_for_update(&touchpoint, state.clock.now());
    ensure_valid(&state, &update, false)?;

    if !ancestors_present(&state, &path).await {
        return Ok(Outcome::NoContent);
    }

    let existing = state
        .store
        .get_action_document(path.customer_id, path.action_plan_id, action_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, action_id = %action_id, "Failed to read action");
            None
        });
    let Some(existing) = existing else {
        return Ok(Outcome::NoContent);
    };

    let merged = patch::merge(Some(&existing), &update).map_err(|e| {
        AppError::bad_request(format!("Failed to update action {action_id}"))
            .with_source(anyhow::Error::new(e))
    })?;
    let Some(merged) = merged else {
        return Ok(Outcome::NoContent);
    };

    let updated = match state.store.replace_action(action_id, &merged).await {
        Ok(action) => action,
        Err(StoreError::NotFound(_)) => return Ok(Outcome::NoContent),
        Err(e) => return Err(store_failure(format!("Failed to update action {action_id}"), e)),
    };

    metrics::counter!("actions_updated_total").increment(1);
    tracing::info!(action_id = %action_id, customer_id = %path.customer_id, "Action updated");

    publish_in_background(
        state.notifications.clone(),
        ChangeMessage::updated(&path, action_id, updated.last_modified_date, &touchpoint, &base_url),
    );

    Ok(Outcome::Ok(updated))
}

const TOUCHPOINT_HEADERS: &[&str] = &["TouchpointId"];

const fn response(status: u16, description: &'static str, schema: Option<BodySchema>) -> ResponseSpec {
    ResponseSpec {
        status,
        description,
        schema,
    }
}

const ERROR_BODY: Option<BodySchema> = Some(BodySchema::One("Error"));
const ACTION_BODY: Option<BodySchema> = Some(BodySchema::One("Action"));
const MALFORMED: ResponseSpec = response(400, "Request was malformed", ERROR_BODY);
const INVALID: ResponseSpec = response(422, "Action validation error(s)", ERROR_BODY);
const CREATE_HEADERS: &[&str] = &["TouchpointId", "apimurl"];

/// Every action operation, as published in the API definition.
pub const ACTION_ROUTES: &[RouteSpec] = &[
    RouteSpec {
        method: Method::Get,
        path: COLLECTION_PATH,
        operation_id: "GetActions",
        summary: "Return all actions for the given action plan",
        headers: TOUCHPOINT_HEADERS,
        request_body: None,
        responses: &[
            response(200, "Actions found", Some(BodySchema::Many("Action"))),
            response(204, "Customer, interaction, action plan or actions do not exist", None),
            MALFORMED,
        ],
    },
    RouteSpec {
        method: Method::Get,
        path: ITEM_PATH,
        operation_id: "GetAction",
        summary: "Return a single action",
        headers: TOUCHPOINT_HEADERS,
        request_body: None,
        responses: &[
            response(200, "Action found", ACTION_BODY),
            response(204, "Customer, interaction, action plan or action does not exist", None),
            MALFORMED,
        ],
    },
    RouteSpec {
        method: Method::Post,
        path: COLLECTION_PATH,
        operation_id: "PostAction",
        summary: "Create a new action for the given action plan",
        headers: CREATE_HEADERS,
        request_body: Some(BodySchema::One("Action")),
        responses: &[
            response(201, "Action created", ACTION_BODY),
            response(204, "Customer, interaction or action plan does not exist", None),
            MALFORMED,
            response(403, "Customer is read only", ERROR_BODY),
            INVALID,
        ],
    },
    RouteSpec {
        method: Method::Patch,
        path: ITEM_PATH,
        operation_id: "PatchAction",
        summary: "Update an existing action",
        headers: TOUCHPOINT_HEADERS,
        request_body: Some(BodySchema::One("ActionPatch")),
        responses: &[
            response(200, "Action updated", ACTION_BODY),
            response(204, "Customer, interaction, action plan or action does not exist", None),
            MALFORMED,
            INVALID,
        ],
    },
];

fn action_properties(with_identifiers: bool) -> Vec<(&'static str, SchemaNode)> {
    let mut properties = Vec::new();
    if with_identifiers {
        properties.extend([
            ("ActionId", SchemaNode::uuid()),
            ("CustomerId", SchemaNode::uuid()),
            ("ActionPlanId", SchemaNode::uuid()),
        ]);
    }
    properties.extend([
        ("DateActionAgreed", SchemaNode::date_time()),
        ("DateActionAimsToBeCompletedBy", SchemaNode::date_time()),
        ("DateActionActuallyCompleted", SchemaNode::date_time()),
        ("ActionSummary", SchemaNode::bounded_string(ACTION_SUMMARY_MAX_LENGTH)),
        ("SignpostedTo", SchemaNode::bounded_string(SIGNPOSTED_TO_MAX_LENGTH)),
        ("SignpostedToCategory", SchemaNode::reference_data::<SignpostedToCategory>()),
        ("ActionType", SchemaNode::reference_data::<ActionType>()),
        ("ActionStatus", SchemaNode::reference_data::<ActionStatus>()),
        ("PersonResponsible", SchemaNode::reference_data::<PersonResponsible>()),
        ("LastModifiedDate", SchemaNode::date_time()),
        ("LastModifiedTouchpointId", SchemaNode::fixed_string(TOUCHPOINT_ID_LENGTH)),
    ]);
    properties
}

/// Component schemas referenced by [`ACTION_ROUTES`].
#[must_use]
pub fn action_schemas() -> Vec<(&'static str, SchemaNode)> {
    vec![
        (
            "Action",
            SchemaNode::Object {
                properties: action_properties(true),
                required: vec![
                    "DateActionAgreed",
                    "DateActionAimsToBeCompletedBy",
                    "ActionSummary",
                    "SignpostedToCategory",
                    "ActionType",
                    "PersonResponsible",
                ],
            },
        ),
        (
            "ActionPatch",
            SchemaNode::Object {
                properties: action_properties(false),
                required: Vec::new(),
            },
        ),
        (
            "Error",
            SchemaNode::Object {
                properties: vec![
                    ("code", SchemaNode::string()),
                    ("message", SchemaNode::string()),
                    (
                        "errors",
                        SchemaNode::array(SchemaNode::Object {
                            properties: vec![
                                ("field", SchemaNode::string()),
                                ("message", SchemaNode::string()),
                            ],
                            required: vec!["field", "message"],
                        }),
                    ),
                ],
                required: vec!["code", "message"],
            },
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_guid_names_the_parameter() {
        let error = action_path("not-a-guid", &uuid::Uuid::new_v4().to_string(), &uuid::Uuid::new_v4().to_string())
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(
            error
                .to_string()
                .ends_with("Unable to parse 'customerId' to a Guid: not-a-guid")
        );
    }

    #[test]
    fn null_and_malformed_bodies_are_unprocessable() {
        for body in [&b"null"[..], &b"{"[..], &b""[..], &b"[1,2]"[..]] {
            let error = parse_body::<Action>(body).unwrap_err();
            assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn object_body_parses() {
        let action: Action = parse_body(br#"{"ActionSummary":"Apply"}"#).unwrap();
        assert_eq!(action.action_summary.as_deref(), Some("Apply"));
    }

    #[test]
    fn routes_reference_declared_schemas() {
        let names: Vec<&str> = action_schemas().iter().map(|(name, _)| *name).collect();
        for route in ACTION_ROUTES {
            let bodies = route
                .responses
                .iter()
                .filter_map(|r| r.schema)
                .chain(route.request_body);
            for body in bodies {
                let (BodySchema::One(name) | BodySchema::Many(name)) = body;
                assert!(names.contains(&name), "{} references {name}", route.operation_id);
            }
        }
    }
}
