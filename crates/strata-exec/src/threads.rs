use strata_model::Env;

/// Variables the classifier and filter tools read to size their thread pools.
pub const DEFAULT_THREAD_VARS: &[&str] = &["OMP_NUM_THREADS", "ITK_GLOBAL_DEFAULT_NUMBER_OF_THREADS"];

/// Environment capping every variable in `vars` to `threads`.
pub fn thread_env<S: AsRef<str>>(threads: usize, vars: &[S]) -> Env {
    let value = threads.max(1).to_string();
    let mut env = Env::new();
    for var in vars {
        env.push(var.as_ref(), value.as_str());
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_var_gets_the_budget() {
        let env = thread_env(4, DEFAULT_THREAD_VARS);
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("OMP_NUM_THREADS"), Some("4"));
        assert_eq!(env.get("ITK_GLOBAL_DEFAULT_NUMBER_OF_THREADS"), Some("4"));
    }

    #[test]
    fn zero_is_raised_to_one() {
        let env = thread_env(0, &["OMP_NUM_THREADS"]);
        assert_eq!(env.get("OMP_NUM_THREADS"), Some("1"));
    }
}
