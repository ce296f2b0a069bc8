use futures::{Stream, StreamExt, stream};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SignalTo {
    /// Stop accepting datagrams and drain in-flight work.
    Shutdown,
    /// Shutdown process immediately.
    Quit,
}

/// Signals from OS/user.
#[cfg(unix)]
pub fn signals() -> impl Stream<Item = SignalTo> {
    use tokio::signal::unix::{SignalKind, signal};

    let listen = |kind: SignalKind, to: SignalTo| {
        let signal = signal(kind).expect("Signal handlers should not panic.");
        stream::unfold(signal, move |mut signal| async move {
            signal.recv().await.map(|_| (to, signal))
        })
        .boxed()
    };

    stream::select_all([
        listen(SignalKind::interrupt(), SignalTo::Shutdown),
        listen(SignalKind::terminate(), SignalTo::Shutdown),
        listen(SignalKind::quit(), SignalTo::Quit),
    ])
}

/// Signals from OS/user.
#[cfg(windows)]
pub fn signals() -> impl Stream<Item = SignalTo> {
    stream::unfold((), |()| async {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| (SignalTo::Shutdown, ()))
    })
}
