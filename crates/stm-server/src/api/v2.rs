//! Second API revision: identifiers travel as path segments.

use super::params::{json_body, text_body};
use super::{ApiRequest, Call, Method};
use crate::error::ApiError;

fn segment(raw: &str) -> Result<String, ApiError> {
    urlencoding::decode(raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ApiError::bad_request(format!("URL decode: {e}")))
}

fn remove_user(id: &str, user: &str) -> Result<Call, ApiError> {
    Ok(Call::RemoveUser {
        project_id: segment(id)?,
        user: segment(user)?,
    })
}

fn update_name(id: &str, body: &str) -> Result<Call, ApiError> {
    Ok(Call::UpdateName {
        project_id: segment(id)?,
        name: text_body(body)?,
    })
}

fn update_description(id: &str, body: &str) -> Result<Call, ApiError> {
    Ok(Call::UpdateDescription {
        project_id: segment(id)?,
        description: text_body(body)?,
    })
}

pub(super) fn route(request: &ApiRequest, segments: &[&str]) -> Option<Result<Call, ApiError>> {
    let call = match (request.method, segments) {
        (Method::Get, ["projects"]) => Ok(Call::GetProjects),
        (Method::Post, ["projects"]) => json_body(&request.body).map(Call::AddProject),
        (Method::Delete, ["projects", id]) => {
            segment(id).map(|project_id| Call::DeleteProject { project_id })
        }
        (Method::Get, ["projects", id, "tasks"]) => {
            segment(id).map(|project_id| Call::GetProjectTasks { project_id })
        }
        (Method::Post, ["projects", id, "users"]) => request.query().and_then(|query| {
            Ok(Call::AddUser {
                project_id: segment(id)?,
                user: query.require("user")?,
            })
        }),
        (Method::Delete, ["projects", id, "users"]) => {
            segment(id).map(|project_id| Call::LeaveProject { project_id })
        }
        (Method::Delete, ["projects", id, "users", user]) => remove_user(id, user),
        (Method::Put, ["projects", id, "name"]) => update_name(id, &request.body),
        (Method::Put, ["projects", id, "description"]) => update_description(id, &request.body),
        (Method::Post, ["tasks"]) => json_body(&request.body).map(Call::AddTasks),
        (Method::Post, ["tasks", id, "assignedUser"]) => {
            segment(id).map(|task_id| Call::AssignUser { task_id })
        }
        (Method::Delete, ["tasks", id, "assignedUser"]) => {
            segment(id).map(|task_id| Call::UnassignUser { task_id })
        }
        (Method::Post, ["tasks", id, "processPoints"]) => request.query().and_then(|query| {
            Ok(Call::SetProcessPoints {
                task_id: segment(id)?,
                process_points: query.require_i64("process_points")?,
            })
        }),
        _ => return None,
    };
    Some(call)
}
