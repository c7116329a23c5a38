//! Mock inference call: simulated latency and a synthetic response string

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Key every call must provide
pub const PROMPT_KEY: &str = "prompt";

/// Number of random digits appended to the prompt
pub const RESPONSE_DIGITS: usize = 10;

const RESPONSE_SEPARATOR: &str = " : ";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("missing required key `{0}`")]
    MissingKey(String),
}

/// Named inputs for a mock call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParams(Map<String, Value>);

impl ModelParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters holding only a prompt
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        let mut params = Self::new();
        params.insert(PROMPT_KEY, Value::String(prompt.into()));
        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a named input, failing like a dictionary lookup when absent
    pub fn get(&self, key: &str) -> Result<&Value, ModelError> {
        self.0
            .get(key)
            .ok_or_else(|| ModelError::MissingKey(key.to_string()))
    }

    /// The prompt as text. Booleans and null render as `True`/`False`/`None`,
    /// other non-string values as their JSON text.
    pub fn prompt(&self) -> Result<String, ModelError> {
        Ok(match self.get(PROMPT_KEY)? {
            Value::String(s) => s.clone(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Null => "None".to_string(),
            other => other.to_string(),
        })
    }
}

impl From<Map<String, Value>> for ModelParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ModelParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Latency model: `step * n` with `n` drawn uniformly from `0..steps`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayProfile {
    pub step: Duration,
    pub steps: u32,
}

impl Default for DelayProfile {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(5),
            steps: 10,
        }
    }
}

impl DelayProfile {
    /// Profile that never sleeps
    pub fn none() -> Self {
        Self {
            step: Duration::ZERO,
            steps: 1,
        }
    }

    /// Delay for step index `n`, saturating at `Duration::MAX`
    pub fn delay_for(&self, n: u32) -> Duration {
        self.step.checked_mul(n).unwrap_or(Duration::MAX)
    }

    /// Longest delay this profile can produce, or `None` if it overflows
    pub fn max_delay(&self) -> Option<Duration> {
        self.step.checked_mul(self.steps.max(1) - 1)
    }

    /// Every delay this profile can produce, shortest first
    pub fn possible_delays(&self) -> Vec<Duration> {
        (0..self.steps.max(1)).map(|n| self.delay_for(n)).collect()
    }
}

/// Pick one of the profile's discrete delays
pub fn sample_delay<R: Rng>(profile: &DelayProfile, rng: &mut R) -> Duration {
    let steps = profile.steps.max(1);
    profile.delay_for(rng.gen_range(0..steps))
}

/// `n` random characters from `'0'..='9'`
pub fn random_digits<R: Rng>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub fn render_output(prompt: &str, digits: &str) -> String {
    format!("{prompt}{RESPONSE_SEPARATOR}{digits}")
}

/// Draw all randomness up front so callers can sleep without holding the RNG.
fn prepare<R: Rng>(prompt: &str, profile: &DelayProfile, rng: &mut R) -> (String, Duration) {
    let delay = sample_delay(profile, rng);
    let output = render_output(prompt, &random_digits(rng, RESPONSE_DIGITS));
    tracing::debug!(delay_ms = delay.as_millis() as u64, "simulated latency");
    (output, delay)
}

/// Blocking mock call with the default latency profile and an unseeded RNG
pub fn run_model(params: &ModelParams) -> Result<String, ModelError> {
    run_model_with(params, &DelayProfile::default(), &mut rand::thread_rng())
}

/// Blocking mock call with explicit latency profile and RNG
pub fn run_model_with<R: Rng>(
    params: &ModelParams,
    profile: &DelayProfile,
    rng: &mut R,
) -> Result<String, ModelError> {
    tracing::info!("running model");
    let (output, delay) = prepare(&params.prompt()?, profile, rng);
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
    Ok(output)
}

/// Non-blocking variant for use inside an async executor
pub async fn run_model_async(
    params: &ModelParams,
    profile: &DelayProfile,
) -> Result<String, ModelError> {
    tracing::info!("running model");
    Ok(complete_async(&params.prompt()?, profile).await)
}

/// Simulate latency for an already resolved prompt and return the response
pub async fn complete_async(prompt: &str, profile: &DelayProfile) -> String {
    let (output, delay) = prepare(prompt, profile, &mut rand::thread_rng());
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::time::Instant;

    fn seeded_rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(42)
    }

    fn assert_response_shape(prompt: &str, output: &str) {
        let rest = output
            .strip_prefix(prompt)
            .and_then(|s| s.strip_prefix(" : "))
            .unwrap_or_else(|| panic!("unexpected output {output:?}"));
        assert_eq!(rest.len(), RESPONSE_DIGITS);
        assert!(rest.chars().all(|c| c.is_ascii_digit()), "{rest:?}");
    }

    #[test]
    fn test_run_model_output_shape() {
        for prompt in ["hello", "", "two words", "naïve ünïcode", " : "] {
            let out = run_model_with(
                &ModelParams::with_prompt(prompt),
                &DelayProfile::none(),
                &mut seeded_rng(),
            )
            .unwrap();
            assert_response_shape(prompt, &out);
        }
    }

    #[test]
    fn test_run_model_default_profile() {
        let out = run_model(&ModelParams::with_prompt("ping")).unwrap();
        assert_response_shape("ping", &out);
    }

    #[test]
    fn test_missing_prompt_is_lookup_error() {
        let params: ModelParams = [("temperature", 0.5)].into_iter().collect();
        let err = run_model(&params).unwrap_err();
        assert_eq!(err, ModelError::MissingKey("prompt".into()));
    }

    #[test]
    fn test_missing_prompt_fails_before_sleeping() {
        let profile = DelayProfile {
            step: Duration::from_secs(1),
            steps: 10,
        };
        let start = Instant::now();
        assert!(run_model_with(&ModelParams::new(), &profile, &mut seeded_rng()).is_err());
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_running_model_logged_before_lookup() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let result =
            tracing::subscriber::with_default(subscriber, || run_model(&ModelParams::new()));
        assert!(result.is_err());

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("running model"), "{text:?}");
    }

    #[test]
    fn test_extra_keys_ignored() {
        let mut params = ModelParams::with_prompt("hi");
        params.insert("max_tokens", 16).insert("model", "mock");
        let out = run_model_with(&params, &DelayProfile::none(), &mut seeded_rng()).unwrap();
        assert_response_shape("hi", &out);
    }

    #[test]
    fn test_non_string_prompt_rendered_as_json() {
        let params: ModelParams = [("prompt", 42)].into_iter().collect();
        let out = run_model_with(&params, &DelayProfile::none(), &mut seeded_rng()).unwrap();
        assert_response_shape("42", &out);
    }

    #[test]
    fn test_bool_and_null_prompts_render_like_python() {
        let params: ModelParams = [("prompt", true)].into_iter().collect();
        assert_eq!(params.prompt().unwrap(), "True");
        let params: ModelParams = [("prompt", false)].into_iter().collect();
        assert_eq!(params.prompt().unwrap(), "False");
        let params: ModelParams = [("prompt", Value::Null)].into_iter().collect();
        assert_eq!(params.prompt().unwrap(), "None");
    }

    #[test]
    fn test_default_delay_set() {
        let expected: Vec<Duration> = (0..10).map(|n| Duration::from_millis(5 * n)).collect();
        assert_eq!(DelayProfile::default().possible_delays(), expected);
        assert_eq!(
            DelayProfile::default().max_delay(),
            Some(Duration::from_millis(45))
        );
    }

    #[test]
    fn test_run_model_blocks_for_sampled_delay() {
        let profile = DelayProfile::default();
        for seed in 0..8 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let expected = sample_delay(&profile, &mut rng.clone());

            let start = Instant::now();
            run_model_with(&ModelParams::with_prompt("wait"), &profile, &mut rng).unwrap();
            let elapsed = start.elapsed();

            assert!(elapsed >= expected, "slept {elapsed:?}, expected {expected:?}");
            assert!(elapsed < Duration::from_millis(45 + 200), "slept {elapsed:?}");
        }
    }

    #[test]
    fn test_run_model_blocks_at_least_one_step() {
        let profile = DelayProfile {
            step: Duration::from_millis(30),
            steps: 2,
        };
        let mut rng = (0..)
            .map(rand::rngs::StdRng::seed_from_u64)
            .find(|rng| sample_delay(&profile, &mut rng.clone()) == Duration::from_millis(30))
            .unwrap();

        let start = Instant::now();
        run_model_with(&ModelParams::with_prompt("wait"), &profile, &mut rng).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_overflowing_profile_saturates() {
        let profile = DelayProfile {
            step: Duration::from_millis(u64::MAX),
            steps: u32::MAX,
        };
        assert_eq!(profile.max_delay(), None);
        assert_eq!(profile.delay_for(0), Duration::ZERO);
        assert_eq!(profile.delay_for(u32::MAX), Duration::MAX);

        let mut rng = seeded_rng();
        for _ in 0..100 {
            let d = sample_delay(&profile, &mut rng);
            assert!(d == Duration::ZERO || d >= Duration::from_millis(u64::MAX));
        }
    }

    #[test]
    fn test_sampled_delay_is_discrete() {
        let profile = DelayProfile::default();
        let allowed = profile.possible_delays();
        assert_eq!(allowed.len(), 10);
        assert_eq!(allowed[0], Duration::ZERO);
        assert_eq!(allowed[9], Duration::from_millis(45));

        let mut rng = seeded_rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            let d = sample_delay(&profile, &mut rng);
            assert!(allowed.contains(&d), "unexpected delay {d:?}");
            seen.insert(d);
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_zero_steps_treated_as_one() {
        let profile = DelayProfile {
            step: Duration::from_millis(5),
            steps: 0,
        };
        assert_eq!(sample_delay(&profile, &mut seeded_rng()), Duration::ZERO);
    }

    #[test]
    fn test_random_digits() {
        let digits = random_digits(&mut seeded_rng(), 1_000);
        assert_eq!(digits.len(), 1_000);
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        assert!(random_digits(&mut seeded_rng(), 0).is_empty());
    }

    #[test]
    fn test_params_deserialize_from_json_object() {
        let params: ModelParams =
            serde_json::from_value(serde_json::json!({ "prompt": "from json", "n": 1 })).unwrap();
        assert_eq!(params.prompt().unwrap(), "from json");
    }

    #[tokio::test]
    async fn test_run_model_async() {
        let out = run_model_async(&ModelParams::with_prompt("async"), &DelayProfile::default())
            .await
            .unwrap();
        assert_response_shape("async", &out);
    }

    #[tokio::test]
    async fn test_complete_async_sleeps() {
        let floor = DelayProfile {
            step: Duration::from_millis(20),
            steps: 2,
        };
        let mut slept = false;
        for _ in 0..20 {
            let start = Instant::now();
            let out = complete_async("x", &floor).await;
            assert_response_shape("x", &out);
            if start.elapsed() >= Duration::from_millis(20) {
                slept = true;
                break;
            }
        }
        assert!(slept, "complete_async never waited a full step");
    }
}
