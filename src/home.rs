//! 主页：匹配、通知、好友三个标签页
//!
//! 数据由多个并行请求合并为一个快照，按主页轮询周期刷新。

use std::ops::ControlFlow;

use log::warn;
use skillswap_shared::protocol::FriendRequestDecision;
use skillswap_shared::{Friend, FriendRequest, UnreadPerFriend, UserProfileSummary};

use crate::api::SkillSwapApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::storage::KeyValueStore;

pub const HOME_LOAD_FAILED: &str = "Failed to load homepage data";

// =========================================================
// 快照
// =========================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeSnapshot {
    pub profile: UserProfileSummary,
    pub matches: Vec<UserProfileSummary>,
    pub friend_requests: Vec<FriendRequest>,
    pub friends: Vec<Friend>,
    pub unread_requests: u32,
    pub unread_messages: u32,
    pub unread_per_friend: UnreadPerFriend,
}

impl HomeSnapshot {
    /// 邮箱到显示名，不在好友列表中时返回邮箱本身
    pub fn display_name<'a>(&'a self, email: &'a str) -> &'a str {
        self.friends
            .iter()
            .find(|f| f.email == email)
            .map(|f| f.display_name.as_str())
            .unwrap_or(email)
    }

    pub fn unread_from(&self, email: &str) -> u32 {
        self.unread_per_friend
            .get(email)
            .map(|s| s.unread_count)
            .unwrap_or_default()
    }
}

/// 并行拉取主页所需的全部数据，任一失败则整体失败
pub async fn fetch_home<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
) -> ApiResult<HomeSnapshot> {
    let (profile, matches, friend_requests, friends, unread_requests, unread_messages, per_friend) = futures::try_join!(
        api.my_profile(),
        api.matches(),
        api.friend_requests(),
        api.friends(),
        api.unread_friend_request_count(),
        api.unread_message_count(),
        api.unread_counts_per_friend(),
    )?;

    Ok(HomeSnapshot {
        profile,
        matches: matches.matches,
        friend_requests,
        friends,
        unread_requests: unread_requests.count,
        unread_messages: unread_messages.count,
        unread_per_friend: per_friend,
    })
}

// =========================================================
// 视图状态
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeTab {
    #[default]
    Matches,
    Notifications,
    Friends,
}

impl HomeTab {
    pub const ALL: [HomeTab; 3] = [HomeTab::Matches, HomeTab::Notifications, HomeTab::Friends];

    pub fn label(&self) -> &'static str {
        match self {
            HomeTab::Matches => "Matches",
            HomeTab::Notifications => "Notifications",
            HomeTab::Friends => "Friends",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeView {
    pub snapshot: Option<HomeSnapshot>,
    pub tab: HomeTab,
    /// 最近一次加载失败的详细信息
    pub error: Option<String>,
    pub loading: bool,
    /// 会话失效，视图应退出登录
    pub session_invalid: bool,
}

impl HomeView {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// 轮询结果写回视图；会话失效时停止轮询
    pub fn apply(&mut self, result: ApiResult<HomeSnapshot>) -> ControlFlow<()> {
        self.loading = false;
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
                ControlFlow::Continue(())
            }
            Err(err) => {
                warn!("home load failed: {}", err);
                self.error = Some(err.message_or(HOME_LOAD_FAILED));
                if err.is_session_invalid() {
                    self.session_invalid = true;
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }

    /// 切换标签页，返回是否需要标记好友请求为已读
    pub fn select_tab(&mut self, tab: HomeTab) -> bool {
        self.tab = tab;
        tab == HomeTab::Notifications
    }

    /// 通知已读：清零角标并替换请求列表
    pub fn notifications_seen(&mut self, requests: Vec<FriendRequest>) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.unread_requests = 0;
            snapshot.friend_requests = requests;
        }
    }

    pub fn banner(&self) -> Option<&'static str> {
        self.error.as_ref().map(|_| HOME_LOAD_FAILED)
    }
}

// =========================================================
// 好友操作
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendAction {
    Connect { email: String },
    Accept { request_id: String },
    Reject { request_id: String },
}

impl FriendAction {
    fn fallback(&self) -> &'static str {
        match self {
            FriendAction::Connect { .. } => "Failed to send friend request",
            FriendAction::Accept { .. } => "Failed to accept friend request",
            FriendAction::Reject { .. } => "Failed to reject friend request",
        }
    }

    /// 执行操作，成功与失败都返回要提示给用户的消息
    pub async fn run<C: HttpClient, S: KeyValueStore>(
        &self,
        api: &SkillSwapApi<C, S>,
    ) -> Result<String, String> {
        let result = match self {
            FriendAction::Connect { email } => api.send_friend_request(email).await,
            FriendAction::Accept { request_id } => {
                api.respond_friend_request(request_id, FriendRequestDecision::Accept)
                    .await
            }
            FriendAction::Reject { request_id } => {
                api.respond_friend_request(request_id, FriendRequestDecision::Reject)
                    .await
            }
        };
        result.map_err(|err| err.message_or(self.fallback()))
    }
}

/// 打开通知页：标记已读后重新拉取请求列表
///
/// 失败只记录警告，返回 `None`。
pub async fn open_notifications<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
) -> Option<Vec<FriendRequest>> {
    let result = async {
        api.mark_friend_requests_read().await?;
        api.friend_requests().await
    }
    .await;

    result
        .inspect_err(|err| warn!("Failed to mark friend requests as read: {}", err))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use skillswap_shared::protocol::HttpMethod;

    const BASE: &str = "http://api.test";

    fn api() -> SkillSwapApi<MockHttpClient, MemoryStore> {
        SkillSwapApi::new(BASE, MockHttpClient::new(), MemoryStore::new())
    }

    fn mock_home(client: &MockHttpClient) {
        let url = |path: &str| format!("{BASE}{path}");
        client.mock_response(
            &url("/api/user/profile"),
            200,
            json!({"email": "ada@x.com", "username": "Ada"}),
        );
        client.mock_response(
            &url("/api/users/matches"),
            200,
            json!({"matches": [{"id": "2", "email": "mia@x.com", "username": "Mia"}]}),
        );
        client.mock_response(
            &url("/api/friend/requests"),
            200,
            json!([{"requestId": "r1", "senderUsername": "Sam", "senderEmail": "sam@x.com", "isRead": false}]),
        );
        client.mock_response(
            &url("/api/friend/friends"),
            200,
            json!([{"email": "bob@x.com", "username": "Bob", "skillsOffered": ["rust"]}]),
        );
        client.mock_response(&url("/api/friend/requests/unread-count"), 200, json!({"count": 1}));
        client.mock_response(&url("/api/messages/unread-count"), 200, json!({"count": 4}));
        client.mock_response(
            &url("/api/messages/unread-counts-per-friend"),
            200,
            json!({"bob@x.com": {"unreadCount": 4, "lastMessage": "hi", "lastMessageIsRead": false}}),
        );
    }

    #[tokio::test]
    async fn test_fetch_home_merges_all_sources() {
        let api = api();
        mock_home(api.client());

        let snapshot = fetch_home(&api).await.unwrap();
        assert_eq!(snapshot.profile.display_name, "Ada");
        assert_eq!(snapshot.matches.len(), 1);
        assert_eq!(snapshot.friend_requests[0].sender_display_name, "Sam");
        assert_eq!(snapshot.unread_requests, 1);
        assert_eq!(snapshot.unread_messages, 4);
        assert_eq!(snapshot.unread_from("bob@x.com"), 4);
        assert_eq!(snapshot.display_name("bob@x.com"), "Bob");
        assert_eq!(snapshot.display_name("zed@x.com"), "zed@x.com");
    }

    #[tokio::test]
    async fn test_fetch_home_failure_sets_banner() {
        let api = api();
        mock_home(api.client());
        api.client()
            .mock(HttpMethod::Get, &format!("{BASE}/api/friend/friends"), 500, "db down");

        let mut view = HomeView::new();
        let flow = view.apply(fetch_home(&api).await);

        assert_eq!(flow, ControlFlow::Continue(()));
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some("db down"));
        assert_eq!(view.banner(), Some(HOME_LOAD_FAILED));

        mock_home(api.client());
        view.apply(fetch_home(&api).await);
        assert_eq!(view.banner(), None);
        assert!(view.snapshot.is_some());
    }

    #[tokio::test]
    async fn test_invalid_session_stops_home_polling() {
        let api = api();
        api.client().mock_response(
            &format!("{BASE}/api/user/profile"),
            401,
            json!("Invalid token: expired"),
        );

        let mut view = HomeView::new();
        assert_eq!(view.apply(fetch_home(&api).await), ControlFlow::Break(()));
        assert!(view.session_invalid);
    }

    #[tokio::test]
    async fn test_friend_action_messages() {
        let api = api();
        api.client().mock(
            HttpMethod::Post,
            &format!("{BASE}/api/friend/request"),
            200,
            "Friend request sent",
        );
        api.client().mock(
            HttpMethod::Post,
            &format!("{BASE}/api/friend/request/r1/accept"),
            400,
            "Request already handled",
        );
        api.client().mock(
            HttpMethod::Post,
            &format!("{BASE}/api/friend/request/r1/reject"),
            500,
            "",
        );

        let connect = FriendAction::Connect {
            email: "mia@x.com".into(),
        };
        assert_eq!(connect.run(&api).await, Ok("Friend request sent".to_string()));

        let accept = FriendAction::Accept {
            request_id: "r1".into(),
        };
        assert_eq!(accept.run(&api).await, Err("Request already handled".to_string()));

        let reject = FriendAction::Reject {
            request_id: "r1".into(),
        };
        assert_eq!(
            reject.run(&api).await,
            Err("Failed to reject friend request".to_string())
        );

        let reqs = api.client().requests.borrow();
        assert_eq!(reqs[0].3.as_deref(), Some(r#"{"receiverEmail":"mia@x.com"}"#));
    }

    #[tokio::test]
    async fn test_open_notifications() {
        let api = api();
        mock_home(api.client());
        api.client().mock(
            HttpMethod::Post,
            &format!("{BASE}/api/friend/requests/mark-read"),
            200,
            "Marked as read",
        );

        let mut view = HomeView::new();
        view.apply(fetch_home(&api).await);
        assert!(view.select_tab(HomeTab::Notifications));

        let requests = open_notifications(&api).await.unwrap();
        view.notifications_seen(requests);
        assert_eq!(view.snapshot.as_ref().unwrap().unread_requests, 0);
        assert!(!view.select_tab(HomeTab::Friends));
    }

    #[tokio::test]
    async fn test_open_notifications_failure_is_quiet() {
        let api = api();
        api.client().mock(
            HttpMethod::Post,
            &format!("{BASE}/api/friend/requests/mark-read"),
            500,
            "oops",
        );
        assert!(open_notifications(&api).await.is_none());
        // 标记失败时不再拉取列表
        assert_eq!(api.client().count(&format!("{BASE}/api/friend/requests")), 0);
    }
}
