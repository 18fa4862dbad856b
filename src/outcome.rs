use crate::subject::Publisher;

/// Side-effecting consumers of a result.
pub trait OutcomeExt<S, F>: Sized {
    /// Calls exactly one of the handlers, right away, depending on the variant.
    ///
    /// ```
    /// use result_extensions::OutcomeExt;
    ///
    /// let mut log = vec![];
    /// let result: Result<u8, &str> = Ok(5);
    ///
    /// result.fold(|v| log.push(format!("ok {}", v)), |e| panic!("{}", e));
    /// assert_eq!(log, ["ok 5"]);
    /// ```
    fn fold<OnSuccess, OnFailure>(self, on_success: OnSuccess, on_failure: OnFailure)
    where
        OnSuccess: FnOnce(S),
        OnFailure: FnOnce(F);

    /// Hands whole result, whichever variant it is, to the publisher.
    fn publish<P>(self, subject: &P)
    where
        P: Publisher<Self> + ?Sized;
}

impl<S, F> OutcomeExt<S, F> for Result<S, F> {
    fn fold<OnSuccess, OnFailure>(self, on_success: OnSuccess, on_failure: OnFailure)
    where
        OnSuccess: FnOnce(S),
        OnFailure: FnOnce(F),
    {
        match self {
            Ok(value) => on_success(value),
            Err(error) => on_failure(error),
        }
    }

    fn publish<P>(self, subject: &P)
    where
        P: Publisher<Self> + ?Sized,
    {
        subject.publish(self)
    }
}
