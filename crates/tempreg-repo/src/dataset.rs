//! Dataset version documents.
//!
//! A [`Dataset`] is serialized as JSON and written to the block store as a
//! [`ObjectKind::Dataset`](tempreg_store::ObjectKind) object; its path is the
//! content address of that document. The body is stored separately as a blob
//! and referenced by path from [`Dataset::body`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempreg_crypto::{Signature, SigningKey, VerifyingKey};
use tempreg_types::{DatasetRef, PeerId};

use crate::error::{RepoError, RepoResult};

/// One version of a dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub peername: String,
    pub name: String,
    pub profile_id: Option<PeerId>,
    /// Content path of this document. Not part of the hashed document; set
    /// after the document is written or read.
    #[serde(skip)]
    pub path: Option<String>,
    pub previous_path: Option<String>,
    pub commit: Option<Commit>,
    pub meta: Option<Meta>,
    pub structure: Option<Structure>,
    /// File name the body was supplied under, e.g. `body.csv`.
    pub body_path: String,
    /// Content path of the body blob.
    pub body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub title: String,
    pub timestamp: DateTime<Utc>,
    /// 1 for the first version of a dataset, incremented on every save.
    pub seq: u64,
    pub author: PeerId,
    pub signature: Option<Signature>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub title: String,
    pub description: String,
}

impl Meta {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Shape of a tabular body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub format: String,
    pub header: Vec<String>,
    /// Number of data rows, excluding the header.
    pub entries: u64,
    /// Body length in bytes.
    pub length: u64,
}

impl Structure {
    /// Derive the structure of a CSV body.
    pub fn from_csv(body: &[u8]) -> RepoResult<Self> {
        let (header, rows) = parse_csv(body)?;
        Ok(Self {
            format: "csv".into(),
            header,
            entries: rows.len() as u64,
            length: body.len() as u64,
        })
    }
}

/// Parse a CSV body into its header and data rows.
///
/// Rows may carry more or fewer fields than the header.
pub fn parse_csv(body: &[u8]) -> RepoResult<(Vec<String>, Vec<Vec<String>>)> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RepoError::InvalidBody("body is empty".into()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);
    let header = reader
        .headers()
        .map_err(|e| RepoError::InvalidBody(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| RepoError::InvalidBody(e.to_string()))
        })
        .collect::<RepoResult<Vec<Vec<String>>>>()?;
    Ok((header, rows))
}

impl Dataset {
    /// Reference to this version.
    pub fn to_ref(&self) -> DatasetRef {
        let mut r = DatasetRef::new(&self.peername, &self.name);
        if let Some(id) = &self.profile_id {
            r = r.with_profile_id(id.clone());
        }
        if let Some(path) = &self.path {
            r = r.with_path(path);
        }
        r
    }

    /// `peername/name`.
    pub fn alias(&self) -> String {
        format!("{}/{}", self.peername, self.name)
    }

    /// Bytes covered by the commit signature: the document with the
    /// signature itself cleared.
    fn signing_bytes(&self) -> RepoResult<Vec<u8>> {
        let mut unsigned = self.clone();
        if let Some(commit) = unsigned.commit.as_mut() {
            commit.signature = None;
        }
        serde_json::to_vec(&unsigned).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    pub fn sign(&mut self, key: &SigningKey) -> RepoResult<()> {
        let bytes = self.signing_bytes()?;
        let commit = self
            .commit
            .as_mut()
            .ok_or_else(|| RepoError::Identity("cannot sign a dataset without a commit".into()))?;
        commit.signature = Some(key.sign(&bytes));
        Ok(())
    }

    /// Check the commit signature against `key`.
    pub fn verify_signature(&self, key: &VerifyingKey) -> RepoResult<()> {
        let signature = self
            .commit
            .as_ref()
            .and_then(|c| c.signature.as_ref())
            .ok_or_else(|| RepoError::Identity("dataset is not signed".into()))?;
        key.verify(&self.signing_bytes()?, signature)
            .map_err(|e| RepoError::Identity(e.to_string()))
    }

    pub fn to_json_bytes(&self) -> RepoResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> RepoResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| RepoError::Serialization(e.to_string()))
    }
}
