use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A commit as delivered by a commit source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Unique commit ID (SHA)
    pub sha: String,
    /// Parent commit IDs, primary parent first
    pub parents: Vec<String>,
    /// Branches whose tip reaches this commit; the first one owns the lane
    #[serde(default)]
    pub branches: Vec<String>,
    /// Tags pointing at this commit
    #[serde(default)]
    pub tags: Vec<String>,
    /// Commit time in seconds since the epoch
    #[serde(default)]
    pub timestamp: i64,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Commit message (short)
    #[serde(default)]
    pub message: String,
}

impl CommitRecord {
    pub fn new(sha: impl Into<String>, parents: Vec<String>, timestamp: i64) -> Self {
        Self {
            sha: sha.into(),
            parents,
            branches: Vec::new(),
            tags: Vec::new(),
            timestamp,
            author: String::new(),
            message: String::new(),
        }
    }

    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_meta(mut self, author: impl Into<String>, message: impl Into<String>) -> Self {
        self.author = author.into();
        self.message = message.into();
        self
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn primary_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Parents beyond the primary one
    pub fn merge_parents(&self) -> &[String] {
        self.parents.get(1..).unwrap_or(&[])
    }

    /// Abbreviated SHA for display
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }
}

/// A commit as it appears on the wire, before required fields are checked.
///
/// `sha` and `parents` are optional here so that a record missing either one
/// can be counted and dropped instead of failing the whole decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommitRecord {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub parents: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub branches: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Required field absent from a raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingField {
    Sha,
    Parents,
}

impl RawCommitRecord {
    /// Decode one element of a commit list without failing.
    ///
    /// A field of the wrong type counts as absent: a bad `sha` or `parents`
    /// leaves the record malformed, a bad optional field falls back to empty.
    pub fn from_value(value: &Value) -> Self {
        let text = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        let list = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_array)
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
        };

        Self {
            sha: text("sha"),
            parents: list("parents"),
            branches: list("branches").unwrap_or_default(),
            tags: list("tags").unwrap_or_default(),
            timestamp: value.get("timestamp").and_then(Value::as_i64).unwrap_or_default(),
            author: text("author").unwrap_or_default(),
            message: text("message").unwrap_or_default(),
        }
    }

    /// Decode a JSON array of commit records, element by element
    pub fn decode_list(json: &str) -> serde_json::Result<Vec<Self>> {
        let values: Vec<Value> = serde_json::from_str(json)?;
        Ok(values.iter().map(Self::from_value).collect())
    }

    /// Validate required fields. A blank sha counts as missing.
    pub fn into_record(self) -> Result<CommitRecord, MissingField> {
        let sha = match self.sha {
            Some(sha) if !sha.trim().is_empty() => sha,
            _ => return Err(MissingField::Sha),
        };
        let parents = self.parents.ok_or(MissingField::Parents)?;

        Ok(CommitRecord {
            sha,
            parents,
            branches: self.branches,
            tags: self.tags,
            timestamp: self.timestamp,
            author: self.author,
            message: self.message,
        })
    }
}

impl From<CommitRecord> for RawCommitRecord {
    fn from(record: CommitRecord) -> Self {
        Self {
            sha: Some(record.sha),
            parents: Some(record.parents),
            branches: record.branches,
            tags: record.tags,
            timestamp: record.timestamp,
            author: record.author,
            message: record.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_input_contract() {
        let json = r#"{"sha":"abc","parents":["p1","p2"],"branches":["main"],
            "tags":["v1"],"timestamp":42,"author":"Alice","message":"Merge"}"#;
        let record: CommitRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.sha, "abc");
        assert!(record.is_merge());
        assert_eq!(record.primary_parent(), Some("p1"));
        assert_eq!(record.merge_parents(), &["p2".to_string()]);
        assert_eq!(record.tags, vec!["v1"]);
    }

    #[test]
    fn raw_record_reports_missing_fields() {
        let no_sha: RawCommitRecord = serde_json::from_str(r#"{"parents":[]}"#).unwrap();
        assert_eq!(no_sha.into_record(), Err(MissingField::Sha));

        let blank_sha: RawCommitRecord =
            serde_json::from_str(r#"{"sha":"  ","parents":[]}"#).unwrap();
        assert_eq!(blank_sha.into_record(), Err(MissingField::Sha));

        let no_parents: RawCommitRecord = serde_json::from_str(r#"{"sha":"abc"}"#).unwrap();
        assert_eq!(no_parents.into_record(), Err(MissingField::Parents));
    }

    #[test]
    fn null_optional_fields_decode_as_empty() {
        let raw: RawCommitRecord = serde_json::from_str(
            r#"{"sha":"abc","parents":[],"branches":null,"tags":null,"author":null}"#,
        )
        .unwrap();
        let record = raw.into_record().unwrap();
        assert!(record.branches.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.author, "");
    }

    #[test]
    fn wrong_typed_elements_stay_in_the_list() {
        let raw = RawCommitRecord::decode_list(
            r#"[
                {"sha":"a","parents":[],"branches":null,"timestamp":1},
                {"sha":7,"parents":[],"branches":["main"]},
                {"sha":"c","parents":"a"},
                {"sha":"d","parents":["a"],"tags":[1,2],"timestamp":"late"},
                42
            ]"#,
        )
        .unwrap();

        assert_eq!(raw.len(), 5);
        let results: Vec<_> = raw.into_iter().map(RawCommitRecord::into_record).collect();
        assert_eq!(results[0].as_ref().map(|r| r.sha.as_str()), Ok("a"));
        assert_eq!(results[1], Err(MissingField::Sha));
        assert_eq!(results[2], Err(MissingField::Parents));
        let d = results[3].as_ref().unwrap();
        assert!(d.tags.is_empty());
        assert_eq!(d.timestamp, 0);
        assert_eq!(results[4], Err(MissingField::Sha));
    }

    #[test]
    fn decode_list_rejects_non_arrays() {
        assert!(RawCommitRecord::decode_list(r#"{"sha":"a"}"#).is_err());
        assert!(RawCommitRecord::decode_list("[1,").is_err());
    }

    #[test]
    fn short_sha_truncates() {
        let record = CommitRecord::new("0123456789abcdef", vec![], 0);
        assert_eq!(record.short_sha(), "01234567");
        assert_eq!(CommitRecord::new("abc", vec![], 0).short_sha(), "abc");
    }
}
