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

//! Turns paged list RPCs into streams of pages and streams of items.
//!
//! List RPCs that follow [AIP-158] return one page of results and a
//! `next_page_token`. [Paginator] yields the initial response (already
//! fetched by the caller, it is never fetched again) and then re-invokes the
//! RPC with each `next_page_token` until the service returns an empty token.
//! [ItemPaginator] flattens the pages into their items, preserving the order.
//!
//! Both expose [latest_response()][Paginator::latest_response] to inspect
//! aggregate fields, such as `unreachable` locations, of the most recently
//! received page.
//!
//! The blocking variants implement [Iterator] on top of a Tokio runtime.
//!
//! [AIP-158]: https://google.aip.dev/158

use crate::Result;
use crate::error::Error;
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use pin_project::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Describes a response that can be paginated.
pub trait PageableResponse: Clone + Send + 'static {
    type PageItem: Send;

    /// Consumes the response and returns the items in this page.
    fn items(self) -> Vec<Self::PageItem>;

    /// The token to fetch the next page, empty on the last page.
    fn next_page_token(&self) -> String;
}

type Execute<T> = Arc<dyn Fn(String) -> BoxFuture<'static, Result<T>> + Send + Sync>;

enum Next<T> {
    Initial(T),
    Token(String),
    Fetching(String, BoxFuture<'static, Result<T>>),
    Stalled(String),
    Done,
}

/// A stream of pages from a list RPC.
///
/// The `execute` function captures the original request and the original
/// per-call options. It must set the page token in a copy of the request and
/// issue the RPC with the same options.
pub struct Paginator<T> {
    next: Next<T>,
    execute: Execute<T>,
    latest: Option<T>,
}

impl<T> Paginator<T>
where
    T: PageableResponse,
{
    /// Creates a paginator given the initial response and a function to fetch
    /// the page for a given token.
    pub fn new<F, Fut>(initial: T, execute: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let execute: Execute<T> = Arc::new(move |token| Box::pin(execute(token)));
        Self {
            next: Next::Initial(initial),
            execute,
            latest: None,
        }
    }

    /// Returns the next page.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }

    /// The most recently yielded page, if any.
    pub fn latest_response(&self) -> Option<&T> {
        self.latest.as_ref()
    }

    /// Converts the paginator into a stream of items.
    pub fn items(self) -> ItemPaginator<T> {
        ItemPaginator {
            pages: self,
            buffer: VecDeque::new(),
        }
    }

    fn yield_page(&mut self, page: T, sent_token: Option<String>) -> Poll<Option<Result<T>>> {
        let token = page.next_page_token();
        self.next = match sent_token {
            _ if token.is_empty() => Next::Done,
            Some(sent) if sent == token => Next::Stalled(token),
            _ => Next::Token(token),
        };
        self.latest = Some(page.clone());
        Poll::Ready(Some(Ok(page)))
    }
}

// The state is moved out before polling and the fetch is already boxed, no
// field is structurally pinned.
impl<T> Unpin for Paginator<T> {}

impl<T> Stream for Paginator<T>
where
    T: PageableResponse,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match std::mem::replace(&mut this.next, Next::Done) {
                Next::Done => return Poll::Ready(None),
                Next::Initial(page) => return this.yield_page(page, None),
                Next::Stalled(token) => {
                    return Poll::Ready(Some(Err(Error::deser(StalledPageToken(token)))));
                }
                Next::Token(token) => {
                    let future = (this.execute)(token.clone());
                    this.next = Next::Fetching(token, future);
                }
                Next::Fetching(token, mut future) => match future.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.next = Next::Fetching(token, future);
                        return Poll::Pending;
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                    Poll::Ready(Ok(page)) => return this.yield_page(page, Some(token)),
                },
            }
        }
    }
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.next {
            Next::Initial(_) => "Initial",
            Next::Token(_) => "Token",
            Next::Fetching(_, _) => "Fetching",
            Next::Stalled(_) => "Stalled",
            Next::Done => "Done",
        };
        f.debug_struct("Paginator")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

/// A stream of items from a list RPC, flattening each page in order.
#[pin_project]
pub struct ItemPaginator<T>
where
    T: PageableResponse,
{
    #[pin]
    pages: Paginator<T>,
    buffer: VecDeque<T::PageItem>,
}

impl<T> ItemPaginator<T>
where
    T: PageableResponse,
{
    /// Returns the next item.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }

    /// The most recently fetched page, if any.
    pub fn latest_response(&self) -> Option<&T> {
        self.pages.latest_response()
    }
}

impl<T> Stream for ItemPaginator<T>
where
    T: PageableResponse,
{
    type Item = Result<T::PageItem>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(item) = this.buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            match futures::ready!(this.pages.as_mut().poll_next(cx)) {
                None => return Poll::Ready(None),
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                Some(Ok(page)) => this.buffer.extend(page.items()),
            }
        }
    }
}

/// A blocking iterator over the pages of a list RPC.
pub struct BlockingPaginator<T> {
    runtime: Arc<tokio::runtime::Runtime>,
    inner: Paginator<T>,
}

impl<T> BlockingPaginator<T>
where
    T: PageableResponse,
{
    pub fn new(runtime: Arc<tokio::runtime::Runtime>, inner: Paginator<T>) -> Self {
        Self { runtime, inner }
    }

    /// The most recently yielded page, if any.
    pub fn latest_response(&self) -> Option<&T> {
        self.inner.latest_response()
    }

    /// Converts the iterator into an iterator over items.
    pub fn items(self) -> BlockingItemPaginator<T> {
        BlockingItemPaginator {
            runtime: self.runtime,
            inner: self.inner.items(),
        }
    }
}

impl<T> Iterator for BlockingPaginator<T>
where
    T: PageableResponse,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.inner.next())
    }
}

/// A blocking iterator over the items of a list RPC.
pub struct BlockingItemPaginator<T>
where
    T: PageableResponse,
{
    runtime: Arc<tokio::runtime::Runtime>,
    inner: ItemPaginator<T>,
}

impl<T> BlockingItemPaginator<T>
where
    T: PageableResponse,
{
    /// The most recently fetched page, if any.
    pub fn latest_response(&self) -> Option<&T> {
        self.inner.latest_response()
    }
}

impl<T> Iterator for BlockingItemPaginator<T>
where
    T: PageableResponse,
{
    type Item = Result<T::PageItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.inner.next())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("the service returned the same page token ({0}) it received, the list cannot make progress")]
struct StalledPageToken(String);
