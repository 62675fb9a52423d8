//! Route definitions for the `/image` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::image;
use crate::state::AppState;

/// Routes mounted at `/image`.
///
/// ```text
/// PUT /change-image  -> change_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/change-image", put(image::change_image))
}
