use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha512};

use crate::{
    ApiError, FileType, Problem, ProblemFilter, ProblemInfo, ProblemService, RemoteTest,
    ResourceAdvancedProperties, SolutionTag, Statement, TestGroupRecord, TestRecord,
};

/// Requests uploading big tests may take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// A client of the Polygon API, authenticated with an API key and its secret.
#[derive(Debug, Clone)]
pub struct PolygonClient {
    /// Base url of the API, e.g. `https://polygon.codeforces.com/api`.
    api_url: String,
    api_key: String,
    api_secret: String,
    http: Client,
}

/// A problem bound to the client that can modify it.
#[derive(Debug, Clone)]
pub struct RemoteProblem<'a> {
    client: &'a PolygonClient,
    problem: Problem,
}

/// The parameters of a single API call, in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Params {
    entries: Vec<(&'static str, Vec<u8>)>,
}

#[derive(Debug, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

impl Params {
    pub(crate) fn new() -> Params {
        Params::default()
    }

    pub(crate) fn add<T: ToString>(mut self, key: &'static str, value: T) -> Params {
        self.entries.push((key, value.to_string().into_bytes()));
        self
    }

    pub(crate) fn add_opt<T: ToString>(self, key: &'static str, value: Option<T>) -> Params {
        match value {
            Some(value) => self.add(key, value),
            None => self,
        }
    }

    pub(crate) fn add_bytes(mut self, key: &'static str, value: &[u8]) -> Params {
        self.entries.push((key, value.to_vec()));
        self
    }

    /// Compute the `apiSig` parameter: the prefix followed by the hex SHA-512 of
    /// `prefix/method?sorted-params#secret`.
    pub(crate) fn signature(&self, method: &str, secret: &str, prefix: &str) -> String {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort();
        let mut hasher = Sha512::new();
        hasher.update(prefix.as_bytes());
        hasher.update(b"/");
        hasher.update(method.as_bytes());
        hasher.update(b"?");
        for (i, (key, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                hasher.update(b"&");
            }
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value);
        }
        hasher.update(b"#");
        hasher.update(secret.as_bytes());
        format!("{}{}", prefix, hex::encode(hasher.finalize()))
    }

    /// Encode the parameters as an `application/x-www-form-urlencoded` body.
    pub(crate) fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| {
                let value: String = url::form_urlencoded::byte_serialize(value).collect();
                format!("{}={}", key, value)
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Interpret the body of a response of the API.
pub(crate) fn parse_response(method: &str, status: u16, body: &str) -> Result<Value, ApiError> {
    let response: Response =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
            method: method.to_string(),
            status,
            reason: e.to_string(),
        })?;
    match response.status.as_str() {
        "OK" => Ok(response.result.unwrap_or(Value::Null)),
        "FAILED" => Err(ApiError::RequestFailed {
            method: method.to_string(),
            comment: response.comment.unwrap_or_default(),
        }),
        other => Err(ApiError::InvalidResponse {
            method: method.to_string(),
            status,
            reason: format!("unknown status {:?}", other),
        }),
    }
}

fn from_result<T: serde::de::DeserializeOwned>(method: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse {
        method: method.to_string(),
        status: 200,
        reason: e.to_string(),
    })
}

impl PolygonClient {
    /// Make a new client for the API at `api_url`.
    pub fn new<S: Into<String>>(api_url: S, api_key: S, api_secret: S) -> Result<Self, ApiError> {
        let http = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Transport {
                method: "client setup".into(),
                source,
            })?;
        Ok(PolygonClient {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            http,
        })
    }

    /// Sign and send a request, returning the `result` field of the response.
    pub(crate) fn call(&self, method: &str, params: Params) -> Result<Value, ApiError> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let params = params.add("apiKey", &self.api_key).add("time", time);
        let prefix: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(6)
            .collect();
        let signature = params.signature(method, &self.api_secret, &prefix);
        let params = params.add("apiSig", signature);

        trace!("POST {}/{}", self.api_url, method);
        let transport = |source| ApiError::Transport {
            method: method.to_string(),
            source,
        };
        let response = self
            .http
            .post(format!("{}/{}", self.api_url, method))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(params.encode())
            .send()
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport)?;
        parse_response(method, status, &body)
    }

    /// List the problems visible to the user that match the filter.
    pub fn problems_list(&self, filter: &ProblemFilter) -> Result<Vec<Problem>, ApiError> {
        let params = Params::new()
            .add("showDeleted", filter.show_deleted)
            .add_opt("id", filter.id)
            .add_opt("name", filter.name.as_ref())
            .add_opt("owner", filter.owner.as_ref());
        let result = self.call("problems.list", params)?;
        from_result("problems.list", result)
    }

    /// Create a new empty problem.
    pub fn problem_create(&self, name: &str) -> Result<Problem, ApiError> {
        let result = self.call("problem.create", Params::new().add("name", name))?;
        from_result("problem.create", result)
    }

    /// Bind a problem to this client.
    pub fn problem(&self, problem: Problem) -> RemoteProblem<'_> {
        RemoteProblem {
            client: self,
            problem,
        }
    }
}

impl RemoteProblem<'_> {
    /// The problem as listed by the service.
    pub fn info(&self) -> &Problem {
        &self.problem
    }

    fn call(&self, method: &str, params: Params) -> Result<Value, ApiError> {
        self.client
            .call(method, params.add("problemId", self.problem.id))
    }

    fn mutate(&self, method: &str, params: Params) -> Result<(), ApiError> {
        self.call(method, params).map(|_| ())
    }
}

impl ProblemService for RemoteProblem<'_> {
    fn enable_points(&self, enable: bool) -> Result<(), ApiError> {
        self.mutate("problem.enablePoints", Params::new().add("enable", enable))
    }

    fn enable_groups(&self, test_set: &str, enable: bool) -> Result<(), ApiError> {
        let params = Params::new()
            .add("testset", test_set)
            .add("enable", enable);
        self.mutate("problem.enableGroups", params)
    }

    fn tests(&self, test_set: &str) -> Result<Vec<RemoteTest>, ApiError> {
        let params = Params::new()
            .add("testset", test_set)
            .add("noInputs", false);
        let result = self.call("problem.tests", params)?;
        from_result("problem.tests", result)
    }

    fn save_test(&self, test: &TestRecord) -> Result<(), ApiError> {
        let params = Params::new()
            .add("checkExisting", test.check_existing)
            .add("testset", &test.test_set)
            .add("testIndex", test.index)
            .add_bytes("testInput", test.input.as_bytes())
            .add_opt("testGroup", test.group.as_ref())
            .add_opt("testPoints", test.points)
            .add_opt("testDescription", test.description.as_ref())
            .add("testUseInStatements", test.use_in_statements)
            .add_opt("testInputForStatements", test.input_for_statements.as_ref())
            .add_opt("testOutputForStatements", test.output_for_statements.as_ref())
            .add_opt(
                "verifyInputOutputForStatements",
                test.verify_input_output_for_statements,
            );
        self.mutate("problem.saveTest", params)
    }

    fn save_test_group(&self, group: &TestGroupRecord) -> Result<(), ApiError> {
        let mut params = Params::new()
            .add("testset", &group.test_set)
            .add("group", &group.group)
            .add("pointsPolicy", group.points_policy)
            .add("feedbackPolicy", group.feedback_policy);
        if !group.dependencies.is_empty() {
            params = params.add("dependencies", group.dependencies.join(","));
        }
        self.mutate("problem.saveTestGroup", params)
    }

    fn save_file(
        &self,
        file_type: FileType,
        name: &str,
        content: &[u8],
        properties: Option<&ResourceAdvancedProperties>,
    ) -> Result<(), ApiError> {
        let mut params = Params::new()
            .add("type", file_type)
            .add("name", name)
            .add_bytes("file", content);
        if let Some(properties) = properties {
            let join = |items: Vec<&str>| items.join(";");
            params = params
                .add("forTypes", &properties.for_types)
                .add("main", properties.main)
                .add("stages", join(properties.stages.iter().map(|s| s.as_str()).collect()))
                .add("assets", join(properties.assets.iter().map(|a| a.as_str()).collect()));
        }
        self.mutate("problem.saveFile", params)
    }

    fn save_solution(
        &self,
        name: &str,
        content: &[u8],
        source_type: Option<&str>,
        tag: SolutionTag,
    ) -> Result<(), ApiError> {
        let params = Params::new()
            .add("name", name)
            .add_bytes("file", content)
            .add_opt("sourceType", source_type)
            .add("tag", tag);
        self.mutate("problem.saveSolution", params)
    }

    fn set_checker(&self, name: &str) -> Result<(), ApiError> {
        self.mutate("problem.setChecker", Params::new().add("checker", name))
    }

    fn set_validator(&self, name: &str) -> Result<(), ApiError> {
        self.mutate("problem.setValidator", Params::new().add("validator", name))
    }

    fn save_statement(&self, lang: &str, statement: &Statement) -> Result<(), ApiError> {
        let params = Params::new()
            .add("lang", lang)
            .add_opt("encoding", statement.encoding.as_ref())
            .add_opt("name", statement.name.as_ref())
            .add_opt("legend", statement.legend.as_ref())
            .add_opt("input", statement.input.as_ref())
            .add_opt("output", statement.output.as_ref())
            .add_opt("scoring", statement.scoring.as_ref())
            .add_opt("interaction", statement.interaction.as_ref())
            .add_opt("notes", statement.notes.as_ref())
            .add_opt("tutorial", statement.tutorial.as_ref());
        self.mutate("problem.saveStatement", params)
    }

    fn save_statement_resource(&self, name: &str, content: &[u8]) -> Result<(), ApiError> {
        let params = Params::new().add("name", name).add_bytes("file", content);
        self.mutate("problem.saveStatementResource", params)
    }

    fn update_info(&self, info: &ProblemInfo) -> Result<(), ApiError> {
        let params = Params::new()
            .add_opt("inputFile", info.input_file.as_ref())
            .add_opt("outputFile", info.output_file.as_ref())
            .add_opt("interactive", info.interactive)
            .add_opt("timeLimit", info.time_limit)
            .add_opt("memoryLimit", info.memory_limit);
        self.mutate("problem.updateInfo", params)
    }

    fn save_general_description(&self, description: &str) -> Result<(), ApiError> {
        let params = Params::new().add("description", description);
        self.mutate("problem.saveGeneralDescription", params)
    }

    fn save_general_tutorial(&self, tutorial: &str) -> Result<(), ApiError> {
        let params = Params::new().add("tutorial", tutorial);
        self.mutate("problem.saveGeneralTutorial", params)
    }

    fn save_tags(&self, tags: &[String]) -> Result<(), ApiError> {
        self.mutate("problem.saveTags", Params::new().add("tags", tags.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn test_signature_sorts_parameters() {
        let a = Params::new().add("b", 2).add("a", 1);
        let b = Params::new().add("a", 1).add("b", 2);
        assert_eq!(
            a.signature("problem.info", "secret", "abcdef"),
            b.signature("problem.info", "secret", "abcdef")
        );
    }

    #[test]
    fn test_signature_format() {
        let params = Params::new()
            .add("apiKey", "xxx")
            .add("time", 1234567890)
            .add("problemId", 1);
        let expected = {
            let mut hasher = Sha512::new();
            hasher.update(b"123456/problem.info?apiKey=xxx&problemId=1&time=1234567890#yyy");
            format!("123456{}", hex::encode(hasher.finalize()))
        };
        let signature = params.signature("problem.info", "yyy", "123456");
        assert_eq!(signature, expected);
        assert_that!(signature.len()).is_equal_to(6 + 128);
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let params = Params::new().add("a", 1);
        assert_ne!(
            params.signature("m", "one", "aaaaaa"),
            params.signature("m", "two", "aaaaaa")
        );
    }

    #[test]
    fn test_encode() {
        let params = Params::new()
            .add("name", "a b&c")
            .add_opt("missing", None::<u32>)
            .add_bytes("file", b"1 2\n");
        assert_eq!(params.encode(), "name=a+b%26c&file=1+2%0A");
    }

    #[test]
    fn test_parse_response_ok() {
        let result = parse_response("problems.list", 200, r#"{"status":"OK","result":[]}"#);
        assert_eq!(result.unwrap(), Value::Array(vec![]));
        let result = parse_response("problem.enablePoints", 200, r#"{"status":"OK"}"#);
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_response_failed() {
        let err = parse_response(
            "problem.saveTest",
            400,
            r#"{"status":"FAILED","comment":"testPoints: Points should be non-negative"}"#,
        )
        .unwrap_err();
        assert!(err.is_request_failed());
        assert_eq!(err.reason(), "testPoints: Points should be non-negative");
    }

    #[test]
    fn test_parse_response_garbage() {
        let err = parse_response("problem.saveTest", 502, "<html>Bad gateway</html>").unwrap_err();
        match err {
            ApiError::InvalidResponse { status, .. } => assert_eq!(status, 502),
            _ => panic!("Expecting InvalidResponse but was {:?}", err),
        }
    }
}
