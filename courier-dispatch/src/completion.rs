use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot;

use crate::error::DispatchError;

pub(crate) type Reply<O, E> = oneshot::Sender<Result<O, E>>;

/// Resolves exactly once with the result of a submitted job
///
/// The result is never available before `submit` has returned. Dropping a
/// `Completion` does not cancel the job; the result is simply discarded.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<O, E> {
    rx: oneshot::Receiver<Result<O, E>>,
}

impl<O, E> Completion<O, E> {
    pub(crate) fn channel() -> (Reply<O, E>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl<O, E> Future for Completion<O, E> {
    type Output = Result<O, DispatchError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| match received {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(error)) => Err(DispatchError::Job(error)),
                Err(_) => Err(DispatchError::Abandoned),
            })
    }
}
