// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Request and response interceptors.
//!
//! Every RPC, on every transport, passes through a single chain of
//! [Interceptor]s before reaching the wire. Each interceptor receives the
//! request and a [Next] handle to invoke the rest of the chain. It may change
//! the request or its metadata, short-circuit the call, and change the
//! response or its metadata.
//!
//! The chain runs once per attempt, inside the retry loop.
//!
//! Applications that prefer typed, per-RPC hooks implement [RpcHooks] and
//! install them with [HooksInterceptor]. The hooks run in a fixed order:
//! `pre` on the request, then the call, then `post`, then
//! `post_with_metadata`.

use crate::Result;
use crate::error::Error;
use crate::metadata::Metadata;
use std::marker::PhantomData;
use std::sync::Arc;
use wkt::message::{DynMessage, Message};

/// A request flowing through the interceptor chain.
#[derive(Clone, Debug)]
pub struct RpcRequest {
    /// The fully qualified method name, e.g.
    /// `google.cloud.aiplatform.v1beta1.DatasetService/GetDataset`.
    pub method: &'static str,
    pub message: Box<dyn DynMessage>,
    pub metadata: Metadata,
}

/// A response flowing back through the interceptor chain.
#[derive(Clone, Debug)]
pub struct RpcResponse {
    pub message: Box<dyn DynMessage>,
    pub metadata: Metadata,
}

/// Intercepts RPCs.
#[async_trait::async_trait]
pub trait Interceptor: std::fmt::Debug + Send + Sync {
    /// Handles one attempt of an RPC, usually by calling `next.run()`.
    async fn intercept(&self, request: RpcRequest, next: Next<'_>) -> Result<RpcResponse>;
}

/// The end of the interceptor chain, typically the transport.
#[async_trait::async_trait]
pub trait Terminal: Send + Sync {
    async fn call(&self, request: RpcRequest) -> Result<RpcResponse>;
}

/// The remainder of an interceptor chain.
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    terminal: &'a dyn Terminal,
}

impl<'a> Next<'a> {
    /// Creates the head of a chain.
    pub fn new(interceptors: &'a [Arc<dyn Interceptor>], terminal: &'a dyn Terminal) -> Self {
        Self {
            interceptors,
            terminal,
        }
    }

    /// Invokes the remaining interceptors and then the terminal.
    pub async fn run(self, request: RpcRequest) -> Result<RpcResponse> {
        match self.interceptors.split_first() {
            None => self.terminal.call(request).await,
            Some((head, tail)) => {
                let next = Next {
                    interceptors: tail,
                    terminal: self.terminal,
                };
                head.intercept(request, next).await
            }
        }
    }
}

/// Typed hooks for a single RPC.
///
/// All the hooks default to the identity function.
pub trait RpcHooks<Req, Resp>: std::fmt::Debug + Send + Sync {
    /// Runs before the request is sent.
    fn pre(&self, request: Req, metadata: Metadata) -> (Req, Metadata) {
        (request, metadata)
    }

    /// Runs after a successful response is received.
    fn post(&self, response: Resp) -> Resp {
        response
    }

    /// Runs after [post][RpcHooks::post], with the response metadata.
    fn post_with_metadata(&self, response: Resp, metadata: Metadata) -> (Resp, Metadata) {
        (response, metadata)
    }
}

/// Adapts [RpcHooks] for one method into an [Interceptor].
///
/// Requests for other methods pass through unchanged.
pub struct HooksInterceptor<Req, Resp, H> {
    method: &'static str,
    hooks: H,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp, H> HooksInterceptor<Req, Resp, H>
where
    H: RpcHooks<Req, Resp>,
{
    pub fn new(method: &'static str, hooks: H) -> Self {
        Self {
            method,
            hooks,
            _types: PhantomData,
        }
    }
}

impl<Req, Resp, H> std::fmt::Debug for HooksInterceptor<Req, Resp, H>
where
    H: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HooksInterceptor")
            .field("method", &self.method)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[async_trait::async_trait]
impl<Req, Resp, H> Interceptor for HooksInterceptor<Req, Resp, H>
where
    Req: Message,
    Resp: Message,
    H: RpcHooks<Req, Resp> + 'static,
{
    async fn intercept(&self, request: RpcRequest, next: Next<'_>) -> Result<RpcResponse> {
        if request.method != self.method {
            return next.run(request).await;
        }
        apply_hooks(
            request,
            next,
            |r, m| self.hooks.pre(r, m),
            |r| self.hooks.post(r),
            |r, m| self.hooks.post_with_metadata(r, m),
        )
        .await
    }
}

/// Runs typed hooks around the rest of the chain.
///
/// Generated clients use this function to map their per-RPC hook methods
/// into a single [Interceptor].
pub async fn apply_hooks<Req, Resp, Pre, Post, PostMd>(
    request: RpcRequest,
    next: Next<'_>,
    pre: Pre,
    post: Post,
    post_with_metadata: PostMd,
) -> Result<RpcResponse>
where
    Req: Message,
    Resp: Message,
    Pre: FnOnce(Req, Metadata) -> (Req, Metadata) + Send,
    Post: FnOnce(Resp) -> Resp + Send,
    PostMd: FnOnce(Resp, Metadata) -> (Resp, Metadata) + Send,
{
    let RpcRequest {
        method,
        mut message,
        metadata,
    } = request;
    let typed = take::<Req>(&mut message)?;
    let (typed, metadata) = pre(typed, metadata);
    let request = RpcRequest {
        method,
        message: Box::new(typed),
        metadata,
    };
    let RpcResponse {
        mut message,
        metadata,
    } = next.run(request).await?;
    let typed = post(take::<Resp>(&mut message)?);
    let (typed, metadata) = post_with_metadata(typed, metadata);
    Ok(RpcResponse {
        message: Box::new(typed),
        metadata,
    })
}

fn take<T: Message>(message: &mut Box<dyn DynMessage>) -> Result<T> {
    let typename = message.message_type();
    message
        .downcast_mut::<T>()
        .map(std::mem::take)
        .ok_or_else(|| {
            Error::other(TypeMismatch {
                want: T::typename(),
                got: typename,
            })
        })
}

#[derive(Debug, thiserror::Error)]
#[error("interceptor hooks expected a {want} message, got {got}")]
struct TypeMismatch {
    want: &'static str,
    got: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::rpc::{Code, Status};
    use std::sync::Mutex;
    use wkt::Duration;

    const METHOD: &str = "test.v1.Service/Method";

    /// Echoes the request, and records the metadata it received.
    #[derive(Default)]
    struct Echo {
        seen: Mutex<Vec<Metadata>>,
    }

    #[async_trait::async_trait]
    impl Terminal for Echo {
        async fn call(&self, request: RpcRequest) -> Result<RpcResponse> {
            self.seen.lock().unwrap().push(request.metadata.clone());
            Ok(RpcResponse {
                message: request.message,
                metadata: Metadata::new().with_ascii("server", "echo"),
            })
        }
    }

    #[derive(Debug)]
    struct Tag(&'static str, Arc<Mutex<Vec<String>>>);

    #[async_trait::async_trait]
    impl Interceptor for Tag {
        async fn intercept(&self, mut request: RpcRequest, next: Next<'_>) -> Result<RpcResponse> {
            self.1.lock().unwrap().push(format!("pre-{}", self.0));
            request.metadata.push_ascii("tag", self.0);
            let response = next.run(request).await;
            self.1.lock().unwrap().push(format!("post-{}", self.0));
            response
        }
    }

    fn request() -> RpcRequest {
        RpcRequest {
            method: METHOD,
            message: Box::new(Duration::clamp(1, 0)),
            metadata: Metadata::new().with_ascii("caller", "first"),
        }
    }

    #[tokio::test]
    async fn chain_order() -> anyhow::Result<()> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(Tag("a", log.clone())),
            Arc::new(Tag("b", log.clone())),
        ];
        let terminal = Echo::default();
        let response = Next::new(&chain, &terminal).run(request()).await?;
        assert_eq!(
            response.message.downcast_ref::<Duration>(),
            Some(&Duration::clamp(1, 0))
        );
        assert_eq!(*log.lock().unwrap(), vec!["pre-a", "pre-b", "post-b", "post-a"]);
        let seen = terminal.seen.lock().unwrap();
        let keys = seen[0].iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>();
        assert_eq!(keys, vec!["caller=first", "tag=a", "tag=b"]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_chain() -> anyhow::Result<()> {
        let terminal = Echo::default();
        let response = Next::new(&[], &terminal).run(request()).await?;
        assert_eq!(response.metadata.get("server").map(|v| v.to_string()), Some("echo".to_string()));
        Ok(())
    }

    #[derive(Debug, Default)]
    struct Hooks {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RpcHooks<Duration, Duration> for Hooks {
        fn pre(&self, request: Duration, metadata: Metadata) -> (Duration, Metadata) {
            self.calls.lock().unwrap().push("pre");
            (
                Duration::clamp(request.seconds() + 10, 0),
                metadata.with_ascii("hook", "pre"),
            )
        }
        fn post(&self, response: Duration) -> Duration {
            self.calls.lock().unwrap().push("post");
            Duration::clamp(response.seconds() * 2, 0)
        }
        fn post_with_metadata(&self, response: Duration, metadata: Metadata) -> (Duration, Metadata) {
            self.calls.lock().unwrap().push("post_with_metadata");
            // Observes the value produced by `post`.
            assert_eq!(response.seconds(), 22);
            (response, metadata.with_ascii("hook", "post"))
        }
    }

    #[tokio::test]
    async fn hooks_order() -> anyhow::Result<()> {
        let hooks = Arc::new(HooksInterceptor::new(METHOD, Hooks::default()));
        let chain: Vec<Arc<dyn Interceptor>> = vec![hooks.clone()];
        let terminal = Echo::default();
        let response = Next::new(&chain, &terminal).run(request()).await?;
        assert_eq!(
            response.message.downcast_ref::<Duration>(),
            Some(&Duration::clamp(22, 0))
        );
        assert_eq!(
            response.metadata.get_all("hook").map(|v| v.to_string()).collect::<Vec<_>>(),
            vec!["post"]
        );
        assert_eq!(
            *hooks.hooks.calls.lock().unwrap(),
            vec!["pre", "post", "post_with_metadata"]
        );
        assert!(terminal.seen.lock().unwrap()[0].contains_key("hook"));
        Ok(())
    }

    #[tokio::test]
    async fn hooks_other_method() -> anyhow::Result<()> {
        let hooks = Arc::new(HooksInterceptor::new("test.v1.Service/Other", Hooks::default()));
        let chain: Vec<Arc<dyn Interceptor>> = vec![hooks.clone()];
        let terminal = Echo::default();
        let response = Next::new(&chain, &terminal).run(request()).await?;
        assert_eq!(
            response.message.downcast_ref::<Duration>(),
            Some(&Duration::clamp(1, 0))
        );
        assert!(hooks.hooks.calls.lock().unwrap().is_empty());
        Ok(())
    }

    #[derive(Debug, Default)]
    struct Identity;
    impl RpcHooks<Duration, Duration> for Identity {}

    #[tokio::test]
    async fn hooks_skip_post_on_error() {
        struct Fail;
        #[async_trait::async_trait]
        impl Terminal for Fail {
            async fn call(&self, _request: RpcRequest) -> Result<RpcResponse> {
                Err(Error::service(Status::default().set_code(Code::NotFound)))
            }
        }
        let chain: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(HooksInterceptor::new(METHOD, Hooks::default()))];
        let err = Next::new(&chain, &Fail).run(request()).await.unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn hooks_type_mismatch() {
        let chain: Vec<Arc<dyn Interceptor>> = vec![Arc::new(HooksInterceptor::<
            wkt::Empty,
            wkt::Empty,
            _,
        >::new(METHOD, EmptyHooks))];
        let terminal = Echo::default();
        let err = Next::new(&chain, &terminal).run(request()).await.unwrap_err();
        assert!(err.to_string().contains("google.protobuf.Duration"), "{err}");
        assert!(terminal.seen.lock().unwrap().is_empty());

        let chain: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(HooksInterceptor::new(METHOD, Identity))];
        assert!(Next::new(&chain, &terminal).run(request()).await.is_ok());
    }

    #[derive(Debug)]
    struct EmptyHooks;
    impl RpcHooks<wkt::Empty, wkt::Empty> for EmptyHooks {}
}
