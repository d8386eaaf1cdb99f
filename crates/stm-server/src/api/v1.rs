//! First API revision: identifiers travel as query parameters.

use super::params::json_body;
use super::{ApiRequest, Call, Method};
use crate::error::ApiError;

pub(super) fn route(request: &ApiRequest, segments: &[&str]) -> Option<Result<Call, ApiError>> {
    let call = match (request.method, segments) {
        (Method::Get, ["projects"]) => Ok(Call::GetProjects),
        (Method::Post, ["projects"]) => json_body(&request.body).map(Call::AddProject),
        (Method::Post, ["projects", "users"]) => request.query().and_then(|query| {
            Ok(Call::AddUser {
                project_id: query.require("project")?,
                user: query.require("user")?,
            })
        }),
        (Method::Get, ["tasks"]) => request.query().and_then(|query| {
            Ok(Call::GetTasks {
                task_ids: query.require_list("task_ids")?,
            })
        }),
        (Method::Post, ["tasks"]) => json_body(&request.body).map(Call::AddTasks),
        (Method::Post, ["task", "assignedUser"]) => request
            .query()
            .and_then(|query| query.require("id"))
            .map(|task_id| Call::AssignUser { task_id }),
        (Method::Delete, ["task", "assignedUser"]) => request
            .query()
            .and_then(|query| query.require("id"))
            .map(|task_id| Call::UnassignUser { task_id }),
        (Method::Post, ["task", "processPoints"]) => request.query().and_then(|query| {
            Ok(Call::SetProcessPoints {
                task_id: query.require("id")?,
                process_points: query.require_i64("process_points")?,
            })
        }),
        _ => return None,
    };
    Some(call)
}
