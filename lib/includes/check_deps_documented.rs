// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Shared by every crate in the workspace through `include!`, so that each
// one verifies its own `Cargo.toml` against its own `DEPS.md`.

use std::collections::BTreeSet;
use std::fs;

#[test]
fn check_deps_documented() {
    let manifest = fs::read_to_string("Cargo.toml").expect("Cargo.toml must exist");
    let manifest = toml::from_str::<toml::Table>(&manifest).expect("Cargo.toml must be valid");

    let listed = ["dependencies", "build-dependencies", "dev-dependencies"]
        .into_iter()
        .filter_map(|section| manifest.get(section)?.as_table())
        .flat_map(|table| table.keys().cloned())
        .collect::<BTreeSet<_>>();

    let readme = fs::read_to_string("DEPS.md").expect("DEPS.md must exist");
    let documented = readme
        .lines()
        .filter_map(|line| line.strip_prefix("## "))
        .map(|name| name.trim().to_string())
        .collect::<BTreeSet<_>>();

    let undocumented = listed.difference(&documented).collect::<Vec<_>>();
    let stale = documented.difference(&listed).collect::<Vec<_>>();

    assert!(
        undocumented.is_empty(),
        "dependencies missing from DEPS.md: {undocumented:?}"
    );
    assert!(stale.is_empty(), "DEPS.md lists unused dependencies: {stale:?}");
}
