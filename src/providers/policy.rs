use serde::{Deserialize, Serialize};

use crate::models::Model;

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

/// Which remotely reported models an engine exposes.
///
/// In TOML: `model_list = "all"` or `model_list = ["gpt-4o", "o4-mini"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AllowListRepr", into = "AllowListRepr")]
pub enum AllowList {
    /// Everything the provider reports.
    All,
    /// Only these names, and only if the provider reports them.
    Only(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AllowListRepr {
    Keyword(String),
    Names(Vec<String>),
}

impl TryFrom<AllowListRepr> for AllowList {
    type Error = String;

    fn try_from(repr: AllowListRepr) -> Result<Self, Self::Error> {
        match repr {
            AllowListRepr::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(AllowList::All),
            AllowListRepr::Keyword(k) => {
                Err(format!("expected \"all\" or a list of model names, got {k:?}"))
            }
            AllowListRepr::Names(names) => Ok(AllowList::Only(names)),
        }
    }
}

impl From<AllowList> for AllowListRepr {
    fn from(list: AllowList) -> Self {
        match list {
            AllowList::All => AllowListRepr::Keyword("all".to_string()),
            AllowList::Only(names) => AllowListRepr::Names(names),
        }
    }
}

impl AllowList {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn permits(&self, name: &str) -> bool {
        match self {
            AllowList::All => true,
            AllowList::Only(names) => names.iter().any(|n| n == name),
        }
    }

    /// Drops models the policy rejects and orders the rest by display name.
    pub fn apply(&self, models: Vec<Model>) -> Vec<Model> {
        let mut models: Vec<Model> = models
            .into_iter()
            .filter(|m| self.permits(&m.name))
            .collect();
        models.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.name.cmp(&b.name))
        });
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str) -> Model {
        Model {
            name: name.to_string(),
            display_name: name.to_string(),
            engine_id: Some(1),
            engine_name: String::new(),
        }
    }

    fn names(models: &[Model]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn explicit_list_keeps_only_named_models_sorted() {
        let policy = AllowList::only(["b", "a"]);
        let kept = policy.apply(vec![model("c"), model("b"), model("a")]);
        assert_eq!(names(&kept), ["a", "b"]);
    }

    #[test]
    fn names_absent_upstream_are_not_invented() {
        let policy = AllowList::only(["a", "z"]);
        let kept = policy.apply(vec![model("a"), model("b")]);
        assert_eq!(names(&kept), ["a"]);
    }

    #[test]
    fn all_accepts_everything_and_sorts_by_display_name() {
        let mut pro = model("gemini-2.5-pro");
        pro.display_name = "Gemini 2.5 Pro".to_string();
        let mut flash = model("gemini-2.5-flash");
        flash.display_name = "Gemini 2.5 Flash".to_string();

        let kept = AllowList::All.apply(vec![pro, flash, model("aaa")]);
        assert_eq!(names(&kept), ["gemini-2.5-flash", "gemini-2.5-pro", "aaa"]);
    }

    #[test]
    fn parses_keyword_and_list_forms() {
        let all: AllowList = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, AllowList::All);
        let only: AllowList = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(only, AllowList::only(["x", "y"]));
        assert!(serde_json::from_str::<AllowList>("\"some\"").is_err());
        assert_eq!(serde_json::to_string(&AllowList::All).unwrap(), "\"all\"");
    }
}
