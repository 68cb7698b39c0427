//! Which files answer a query, and in what order.

use std::collections::HashSet;
use std::path::PathBuf;

use tessera_core::{Application, GENERIC_APPLICATION, Profile};

use crate::index::ConfigIndex;

/// Lists the files for `application` and `profiles`, lowest precedence first.
///
/// The order is: `application` files for the default profile, then for
/// each requested profile; then the same for `application` itself. A path
/// already listed is not repeated.
pub fn discover(index: &ConfigIndex, application: &Application, profiles: &[Profile]) -> Vec<PathBuf> {
    let default = Profile::default_profile();
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for app in [GENERIC_APPLICATION, application.as_str()] {
        for profile in std::iter::once(&default).chain(profiles) {
            for path in index.files_for(app, profile.as_str()) {
                if seen.insert(path) {
                    files.push(path.clone());
                }
            }
        }
    }

    files
}
