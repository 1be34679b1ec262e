// SPDX-License-Identifier: MIT

//! Plain-text rendering for `gantry status` and `gantry run`'s final job
//! tree. Flat hierarchy: every child printed here
//! is a direct child of the root, never a grandchild.

use gantry_core::Job;

fn progress(job: &Job) -> String {
    if job.progress_total == 0 {
        return "-".to_string();
    }
    format!("{}/{}", job.progress_current, job.progress_total)
}

fn print_line(job: &Job, indent: &str) {
    println!(
        "{indent}{} [{}] {} status={} progress={}{}",
        job.id,
        job.job_type,
        job.name,
        job.status,
        progress(job),
        job.error.as_deref().map(|e| format!(" error={e:?}")).unwrap_or_default(),
    );
}

pub fn print_job_tree(root: &Job, children: &[Job]) {
    print_line(root, "");
    for child in children {
        print_line(child, "  ");
    }
    if children.is_empty() {
        println!("  (no child jobs)");
    }
}
