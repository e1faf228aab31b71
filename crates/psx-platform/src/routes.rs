//! Control plane routes for one execution instance. Trailing slashes are significant.

const PREFIX: &str = "/api/services/v1/executions";

pub fn get_values(execution_id: &str) -> String {
    format!("{PREFIX}/{execution_id}/get_values/")
}

pub fn update_status(execution_id: &str) -> String {
    format!("{PREFIX}/{execution_id}/update_status/")
}

pub fn upload_output(execution_id: &str, field_name: &str) -> String {
    format!("{PREFIX}/{execution_id}/upload_output/{field_name}/")
}
