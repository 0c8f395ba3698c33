use crate::data_types::profile_data_types::{Achievement, ProfileForm, UserProfile};
use crate::errors::ApiError;

use super::{decode_or_default, list_or_empty, ApiClient, NO_PARAMS};

pub async fn get_achievements(api: &ApiClient) -> Result<Vec<Achievement>, ApiError> {
    let data = api.get("/achievements", NO_PARAMS).await?;
    list_or_empty("/achievements", data)
}

/// achievements of the current user, earned ones flagged
pub async fn get_my_achievements(api: &ApiClient) -> Result<Vec<Achievement>, ApiError> {
    let data = api.get("/achievements/me/all", NO_PARAMS).await?;
    list_or_empty("/achievements/me/all", data)
}

pub async fn get_me(api: &ApiClient) -> Result<UserProfile, ApiError> {
    let data = api.get("/users/me", NO_PARAMS).await?;
    Ok(serde_json::from_value(data)?)
}

pub async fn update_me(api: &ApiClient, form: &ProfileForm) -> Result<UserProfile, ApiError> {
    let data = api.put("/users/me", form).await?;
    Ok(decode_or_default("/users/me", data))
}
