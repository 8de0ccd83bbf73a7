#![allow(dead_code)]

use std::path::Path;

use depwatch_core::Result;
use git2::build::CheckoutBuilder;
use git2::{IndexAddOption, Repository as GitRepository, RepositoryInitOptions};
use tempfile::TempDir;

pub const DEFAULT_BRANCH: &str = "main";

/// A throwaway origin repository with a working tree.
pub struct Origin {
    pub dir: TempDir,
    pub repo: GitRepository,
}

impl Origin {
    pub fn init() -> Result<Self> {
        let dir = TempDir::new().expect("tempdir");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(DEFAULT_BRANCH);
        let repo = GitRepository::init_opts(dir.path(), &opts)?;
        Ok(Self { dir, repo })
    }

    pub fn url(&self) -> String {
        self.dir
            .path()
            .to_str()
            .expect("utf-8 temp path")
            .to_owned()
    }

    pub fn write(&self, path: &str, contents: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(full, contents).expect("write text file");
    }

    pub fn write_bytes(&self, path: &str, contents: &[u8]) {
        std::fs::write(self.dir.path().join(path), contents).expect("write file");
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).expect("remove file");
    }

    /// Stage every change in the working tree, deletions included, and
    /// commit on the current branch.
    pub fn commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = git2::Signature::now("Test", "test@example.com")?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(oid.to_string())
    }

    /// Create `name` at the current HEAD and switch the working tree to it.
    pub fn branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, false)?;
        self.switch(name)
    }

    pub fn switch(&self, name: &str) -> Result<()> {
        self.repo.set_head(&format!("refs/heads/{name}"))?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))?;
        Ok(())
    }
}

pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .expect("read workspace root")
        .next()
        .is_none()
}
