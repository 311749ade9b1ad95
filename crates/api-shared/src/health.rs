use crate::wire::HealthRes;

/// Health check shared by the REST server and the CLI's connectivity probe.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` with status `"ok"`.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
        }
    }

    /// True if `res` is what a healthy server answers.
    pub fn is_healthy(res: &HealthRes) -> bool {
        res.status == Self::check_health().status
    }
}
