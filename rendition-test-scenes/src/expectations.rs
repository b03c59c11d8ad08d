use rendition::{Backend, FilterError};

use crate::scene::FilterScene;

/// What a filter in the scene is expected to look like after construction.
pub struct BindingExpectation {
    pub label: &'static str,
    /// `(name, group, slot)` in registration order.
    pub resources: Vec<(&'static str, u32, u32)>,
    pub backends: Vec<Backend>,
    /// `None` when the bindings should validate.
    pub error: Option<FilterError>,
}

impl BindingExpectation {
    pub fn new(label: &'static str, resources: &[(&'static str, u32, u32)]) -> Self {
        Self {
            label,
            resources: resources.to_vec(),
            backends: vec![Backend::Gpu, Backend::Gl],
            error: None,
        }
    }

    pub fn only(mut self, backend: Backend) -> Self {
        self.backends = vec![backend];
        self
    }

    pub fn with_error(mut self, error: FilterError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Validates the filters of a scene against their expectations.
///
/// Returns a list of human-readable failure descriptions. An empty list means
/// all expectations passed.
pub fn check_bindings(scene: &FilterScene, expectations: &[BindingExpectation]) -> Vec<String> {
    let mut failures = Vec::new();

    for expectation in expectations {
        let Some(filter) = scene.filter(expectation.label) else {
            failures.push(format!("[{}] filter is missing from the scene", expectation.label));
            continue;
        };

        let actual: Vec<_> = filter
            .shader()
            .resources()
            .iter()
            .map(|resource| (&*resource.name, resource.group, resource.slot))
            .collect();
        if actual != expectation.resources {
            failures.push(format!(
                "[{}] expected resources {:?} but got {:?}",
                expectation.label, expectation.resources, actual,
            ));
        }

        for backend in [Backend::Gpu, Backend::Gl] {
            let expected = expectation.backends.contains(&backend);
            if filter.supports(backend) != expected {
                failures.push(format!(
                    "[{}] expected {} support to be {} but it was {}",
                    expectation.label,
                    backend,
                    expected,
                    !expected,
                ));
            }
        }

        let validation = filter.validate_bindings().err();
        if validation != expectation.error {
            failures.push(format!(
                "[{}] expected validation {:?} but got {:?}",
                expectation.label, expectation.error, validation,
            ));
        }
    }

    failures
}
