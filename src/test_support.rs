// Shared test fixtures, pulled into test modules with `include!`.

use std::collections::HashSet;

use crate::core::{ExternalTarget, PackagePath, RawBuildRule};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TestTarget {
    pub(crate) package: PackagePath,
    pub(crate) name: String,
}

impl TestTarget {
    pub(crate) fn new(package: &str, name: &str) -> Self {
        TestTarget {
            package: PackagePath::new(package),
            name: name.to_string(),
        }
    }
}

impl ExternalTarget for TestTarget {
    fn package_path(&self) -> &PackagePath {
        &self.package
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub(crate) fn parse_target(s: &str) -> TestTarget {
    let rest = s.trim_start_matches("//");
    let (pkg, name) = rest.split_once(':').expect("target string must contain ':'");
    TestTarget::new(pkg, name)
}

pub(crate) fn rule(target: TestTarget, deps: &[TestTarget]) -> RawBuildRule<TestTarget, ()> {
    RawBuildRule::new(target, (), deps.iter().cloned().collect::<HashSet<_>>())
}
