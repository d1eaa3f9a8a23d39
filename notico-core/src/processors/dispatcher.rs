//! Dispatcher processor.
//!
//! The Dispatcher is responsible for:
//! - Receiving a decoded `SlackEvent` via the `Processor` trait
//! - Rendering it into at most one `Notification` for the configured channel
//! - Recording the team domain when a connection is established
//!
//! Rendering itself is the pure [`render`] function; the processor only adds
//! the session side effect and logging.

use crate::events::{AccountType, Notification};
use crate::session::SessionState;
use kanau::processor::Processor;
use notico_sdk::objects::SlackEvent;
use std::convert::Infallible;
use tracing::{debug, info};

/// Prefix a chat message must start with to be treated as a command.
pub const COMMAND_PREFIX: &str = "notico:";

/// Maps events to notifications for one target channel.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    notify_channel: String,
    session: SessionState,
}

impl Dispatcher {
    pub fn new(notify_channel: impl Into<String>, session: SessionState) -> Self {
        Self {
            notify_channel: notify_channel.into(),
            session,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}

impl Processor<SlackEvent> for Dispatcher {
    type Output = Option<Notification>;
    type Error = Infallible;

    async fn process(&self, event: SlackEvent) -> Result<Option<Notification>, Infallible> {
        if let SlackEvent::Connected(connected) = &event {
            info!(team_domain = %connected.team_domain, "Connected, recording team domain");
            self.session
                .set_team_domain(connected.team_domain.clone())
                .await;
            return Ok(None);
        }

        let team_domain = self.session.team_domain().await;
        let Some(text) = render(&event, &team_domain) else {
            debug!(kind = event.kind(), "Ignoring event");
            return Ok(None);
        };

        info!(kind = event.kind(), message = %text, "Rendered notification");
        Ok(Some(Notification {
            channel: self.notify_channel.clone(),
            text,
        }))
    }
}

/// Render the notification text for an event, if it has one.
///
/// Missing fields substitute as empty strings.
pub fn render(event: &SlackEvent, team_domain: &str) -> Option<String> {
    let text = match event {
        SlackEvent::ChannelCreated(ev) => {
            format!("<@{}> created #{}", ev.channel.creator, ev.channel.name)
        }
        SlackEvent::ChannelDeleted(ev) => format!("<#{}> was deleted", ev.channel),
        SlackEvent::ChannelRenamed(ev) => {
            format!("<#{}> was renamed to #{}", ev.channel.id, ev.channel.name)
        }
        SlackEvent::ChannelArchived(ev) => format!("<@{}> archived <#{}>", ev.user, ev.channel),
        SlackEvent::ChannelUnarchived(ev) => {
            format!("<@{}> unarchived <#{}>", ev.user, ev.channel)
        }
        SlackEvent::SubteamCreated(ev) => format!(
            "<@{}> created user group <!subteam^{}|{}>: {}",
            ev.subteam.created_by, ev.subteam.id, ev.subteam.handle, ev.subteam.description
        ),
        SlackEvent::TeamJoined(ev) => format!(
            "<@{}> ({}) joined the team ({})",
            ev.user.id,
            ev.user.profile.email,
            AccountType::of(&ev.user)
        ),
        SlackEvent::BotAdded(ev) => format!(
            "bot {} was added https://{}.slack.com/services/{}",
            ev.bot.name, team_domain, ev.bot.id
        ),
        SlackEvent::Message(ev) if is_ping(&ev.text) => "pong".to_string(),
        SlackEvent::Message(_) | SlackEvent::Connected(_) | SlackEvent::Unrecognized { .. } => {
            return None;
        }
    };
    Some(text)
}

/// `notico:` prefix and a `ping` anywhere in the text, both case-sensitive.
fn is_ping(text: &str) -> bool {
    text.starts_with(COMMAND_PREFIX) && text.contains("ping")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notico_sdk::objects::{
        Bot, BotAdded, ChannelArchive, ChannelCreated, ChannelDeleted, ChannelInfo,
        ChannelRenamed, Connected, MessageEvent, Subteam, SubteamCreated, TeamJoin, User,
        UserProfile,
    };

    fn message(text: &str) -> SlackEvent {
        SlackEvent::Message(MessageEvent {
            channel: "C1".into(),
            user: "U1".into(),
            text: text.into(),
            subtype: None,
        })
    }

    fn render_plain(event: &SlackEvent) -> Option<String> {
        render(event, "")
    }

    #[test]
    fn test_render_channel_events() {
        let created = SlackEvent::ChannelCreated(ChannelCreated {
            channel: ChannelInfo {
                id: "C9".into(),
                name: "general".into(),
                creator: "U1".into(),
            },
        });
        assert_eq!(render_plain(&created).as_deref(), Some("<@U1> created #general"));

        let deleted = SlackEvent::ChannelDeleted(ChannelDeleted {
            channel: "C9".into(),
        });
        assert_eq!(render_plain(&deleted).as_deref(), Some("<#C9> was deleted"));

        let renamed = SlackEvent::ChannelRenamed(ChannelRenamed {
            channel: ChannelInfo {
                id: "C9".into(),
                name: "random".into(),
                creator: String::new(),
            },
        });
        assert_eq!(
            render_plain(&renamed).as_deref(),
            Some("<#C9> was renamed to #random")
        );

        let archive = ChannelArchive {
            channel: "C9".into(),
            user: "U2".into(),
        };
        assert_eq!(
            render_plain(&SlackEvent::ChannelArchived(archive.clone())).as_deref(),
            Some("<@U2> archived <#C9>")
        );
        assert_eq!(
            render_plain(&SlackEvent::ChannelUnarchived(archive)).as_deref(),
            Some("<@U2> unarchived <#C9>")
        );
    }

    #[test]
    fn test_render_subteam_created() {
        let event = SlackEvent::SubteamCreated(SubteamCreated {
            subteam: Subteam {
                id: "S1".into(),
                handle: "ops".into(),
                description: "On-call folks".into(),
                created_by: "U3".into(),
            },
        });
        assert_eq!(
            render_plain(&event).as_deref(),
            Some("<@U3> created user group <!subteam^S1|ops>: On-call folks")
        );
    }

    #[test]
    fn test_render_team_join_all_flags_is_bot() {
        let event = SlackEvent::TeamJoined(TeamJoin {
            user: User {
                id: "U4".into(),
                is_bot: true,
                is_restricted: true,
                is_ultra_restricted: true,
                profile: UserProfile {
                    email: "robot@example.com".into(),
                },
            },
        });
        assert_eq!(
            render_plain(&event).as_deref(),
            Some("<@U4> (robot@example.com) joined the team (bot)")
        );
    }

    #[test]
    fn test_render_team_join_guest() {
        let event = SlackEvent::TeamJoined(TeamJoin {
            user: User {
                id: "U5".into(),
                is_ultra_restricted: true,
                profile: UserProfile {
                    email: "guest@example.com".into(),
                },
                ..Default::default()
            },
        });
        assert_eq!(
            render_plain(&event).as_deref(),
            Some("<@U5> (guest@example.com) joined the team (single-channel-guest)")
        );
    }

    #[test]
    fn test_render_bot_added_uses_domain() {
        let event = SlackEvent::BotAdded(BotAdded {
            bot: Bot {
                id: "B1".into(),
                name: "deploybot".into(),
            },
        });
        assert_eq!(
            render(&event, "acme").as_deref(),
            Some("bot deploybot was added https://acme.slack.com/services/B1")
        );
        assert_eq!(
            render(&event, "").as_deref(),
            Some("bot deploybot was added https://.slack.com/services/B1")
        );
    }

    #[test]
    fn test_render_ping_command() {
        assert_eq!(render_plain(&message("notico:say ping!")).as_deref(), Some("pong"));
        assert_eq!(render_plain(&message("notico:ping")).as_deref(), Some("pong"));
        assert_eq!(render_plain(&message("ping notico:")), None);
        assert_eq!(render_plain(&message("notico:PING")), None);
        assert_eq!(render_plain(&message("Notico:ping")), None);
        assert_eq!(render_plain(&message("hello")), None);
    }

    #[test]
    fn test_render_silent_variants() {
        assert_eq!(
            render_plain(&SlackEvent::Connected(Connected {
                team_domain: "acme".into()
            })),
            None
        );
        assert_eq!(
            render_plain(&SlackEvent::Unrecognized {
                kind: "reaction_added".into()
            }),
            None
        );
    }

    #[test]
    fn test_render_missing_fields_are_empty() {
        let event = SlackEvent::ChannelCreated(ChannelCreated::default());
        assert_eq!(render_plain(&event).as_deref(), Some("<@> created #"));
    }

    #[tokio::test]
    async fn test_process_targets_notify_channel() {
        let dispatcher = Dispatcher::new("C0NOTIFY", SessionState::new());
        let notification = dispatcher
            .process(SlackEvent::ChannelDeleted(ChannelDeleted {
                channel: "C9".into(),
            }))
            .await
            .unwrap();
        assert_eq!(
            notification,
            Some(Notification {
                channel: "C0NOTIFY".into(),
                text: "<#C9> was deleted".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_connected_records_domain_before_later_render() {
        let dispatcher = Dispatcher::new("C0NOTIFY", SessionState::new());
        let bot_added = SlackEvent::BotAdded(BotAdded {
            bot: Bot {
                id: "B1".into(),
                name: "deploybot".into(),
            },
        });

        let before = dispatcher.process(bot_added.clone()).await.unwrap().unwrap();
        assert_eq!(before.text, "bot deploybot was added https://.slack.com/services/B1");

        let connected = dispatcher
            .process(SlackEvent::Connected(Connected {
                team_domain: "acme".into(),
            }))
            .await
            .unwrap();
        assert_eq!(connected, None);
        assert_eq!(dispatcher.session().team_domain().await, "acme");

        let after = dispatcher.process(bot_added).await.unwrap().unwrap();
        assert_eq!(after.text, "bot deploybot was added https://acme.slack.com/services/B1");
    }

    #[tokio::test]
    async fn test_unrecognized_produces_nothing() {
        let dispatcher = Dispatcher::new("C0NOTIFY", SessionState::new());
        let outcome = dispatcher
            .process(SlackEvent::Unrecognized {
                kind: "emoji_changed".into(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, None);
    }
}
