use super::{Artifact, Chart, Figure, Section};

pub static SECTIONS: &[Section] = &[
    Section {
        anchor: "description",
        title: "Description",
        summary: &[
            "This dashboard examines Reddit posts across a set of political communities. \
             It tracks posting patterns and content characteristics to give insight into \
             user behavior and discussion trends.",
            "It combines post metrics, community statistics and content features such as \
             domain reliability and title sentiment.",
        ],
        topics: &[
            ("Time Patterns", "When unreliable content appears and when it peaks"),
            ("Community Spread", "How content moves between subreddits and domains through crossposts"),
            ("User Engagement", "Reactions through votes and comments"),
            ("Content Analysis", "Language patterns and emotional tone"),
            ("Author Behavior", "Characteristics of users sharing unreliable content"),
        ],
        charts: &[],
    },
    Section {
        anchor: "time-patterns",
        title: "Time Patterns",
        summary: &[],
        topics: &[],
        charts: &[
            Chart {
                title: "Daily Posting Trends by Reliability",
                description: "Posts per day, split by domain reliability (reliable vs. unreliable).",
                insight: "Spikes in posting activity, especially from unreliable sources, can mark \
                          events used to push content. A surge of unreliable posts may line up with \
                          a news cycle or a coordinated campaign.",
                artifact: Artifact::Html("info_spread/daily_posting_trends.html"),
            },
            Chart {
                title: "Hourly Posting Heatmap",
                description: "Posting frequency by day of week and hour of day; darker cells mean \
                              more activity.",
                insight: "Activity concentrated in particular hours (for example 3 to 7 PM) can point \
                          to contributors in other time zones and hint at coordinated behavior.",
                artifact: Artifact::Html("info_spread/posting_heatmap.html"),
            },
        ],
    },
    Section {
        anchor: "community-spread",
        title: "Community Spread",
        summary: &[],
        topics: &[],
        charts: &[
            Chart {
                title: "Subreddit Frequency Distribution",
                description: "Number of posts in each of ten politically focused subreddits.",
                insight: "Several large subreddits (neoliberal, politics, worldpolitics, socialism) \
                          hold roughly 1,000 posts each, making them the main hubs of political \
                          discussion in the sample.",
                artifact: Artifact::Html("subreddit/subreddit_frequency.html"),
            },
            Chart {
                title: "Top Subreddits for Unreliable Content",
                description: "The ten subreddits with the highest share of posts linking to \
                              unreliable domains.",
                insight: "Communities with the tallest bars (Republican, Conservative) are hotspots \
                          for unreliable content and the first candidates for monitoring.",
                artifact: Artifact::Html("subreddit/top_unreliable_subs.html"),
            },
            Chart {
                title: "Domain Frequency Analysis",
                description: "Three panels breaking down the content sources shared across the \
                              subreddits, comparing reliable and unreliable domains.",
                insight: "The dominance of \"self.\" domains suggests users engage more with \
                          platform-native posts than with external sources, which may reflect more \
                          trust in community content than in traditional media.",
                artifact: Artifact::Html("engagement_analysis/top_domains_analysis.html"),
            },
        ],
    },
    Section {
        anchor: "user-engagement",
        title: "User Engagement",
        summary: &[],
        topics: &[],
        charts: &[
            Chart {
                title: "Engagement Rate of Posts by Subreddit",
                description: "Engagement rate of ten political subreddits over about seven months, \
                              one line per community.",
                insight: "Most communities stayed fairly stable through 2024, then nearly all rose \
                          sharply from January 2025, with Liberal, Republican and neoliberal growing \
                          the most.",
                artifact: Artifact::Html("engagement_analysis/engagement_rate.html"),
            },
            Chart {
                title: "Engagement Distribution",
                description: "Upvote distribution for posts from reliable domains (\"false\") and \
                              unreliable domains (\"true\"); violin width shows density.",
                insight: "Reliable domains reach the highest upvote counts (about 50,000), yet \
                          unreliable domains still peak above 30,000. Misleading content rarely \
                          outperforms reliable content but can occasionally go just as viral.",
                artifact: Artifact::Html("engagement_analysis/upvote_distribution.html"),
            },
            Chart {
                title: "Sentiment-Engagement Patterns",
                description: "Each post placed by title sentiment (-1 negative to +1 positive) and \
                              upvotes received, with transparency to show overlapping density.",
                insight: "Posts above 40,000 upvotes all come from reliable sources; the best \
                          unreliable post reaches about 35,000. The most viral content is \
                          predominantly from trusted sources.",
                artifact: Artifact::Html("engagement_analysis/upvotes_vs_sentiment.html"),
            },
        ],
    },
    Section {
        anchor: "author-behavior",
        title: "Author Behavior",
        summary: &[],
        topics: &[],
        charts: &[
            Chart {
                title: "Crosspost Connection Network",
                description: "Directed graph of users linked by crossposts; node size follows the \
                              number of connections.",
                insight: "A few prominent users dominate the network, the largest acting as the \
                          main propagation hub. Unreliable content is very rarely crossposted.",
                artifact: Artifact::Html("author_behavior/crosspost_network.html"),
            },
            Chart {
                title: "User Contribution for Unreliable Content",
                description: "The ten authors with the most posts from unreliable domains.",
                insight: "Unreliable posting is highly concentrated: the top author accounts for \
                          about 100 posts, roughly five times the runner-up.",
                artifact: Artifact::Html("author_behavior/top_authors_posting_unreliable_domains.html"),
            },
        ],
    },
    Section {
        anchor: "content-analysis",
        title: "Content Analysis",
        summary: &[],
        topics: &[],
        charts: &[
            Chart {
                title: "Average Title Sentiment over Time",
                description: "Average daily sentiment of post titles, from -1 (negative) to +1 \
                              (positive), 0 being neutral.",
                insight: "The sharpest swings happen in November 2024, around the U.S. presidential \
                          election, with sentiment flipping between strongly positive and negative \
                          within days.",
                artifact: Artifact::Html("text_and_sentiment/avg_title_sentiment_over_time.html"),
            },
            Chart {
                title: "Sentiment Distribution Patterns",
                description: "Title sentiment for reliable (\"false\") and unreliable (\"true\") \
                              domains on a -1 to +1 scale.",
                insight: "Both groups have similar medians, so tone alone does not separate \
                          reliable from unreliable sources and would be a weak misinformation \
                          signal on its own.",
                artifact: Artifact::Html("text_and_sentiment/title_sentiment.html"),
            },
            Chart {
                title: "Terminology Patterns",
                description: "Word clouds of post titles, term size proportional to frequency.",
                insight: "\"Trump\" is among the most dominant terms, far larger than \"Biden\", \
                          showing a lopsided focus on the former president in reliable-source \
                          discussion.",
                artifact: Artifact::ImagePair([
                    Figure {
                        caption: "Reliable domain wordcloud",
                        path: "text_and_sentiment/reliable_titles.png",
                    },
                    Figure {
                        caption: "Unreliable domain wordcloud",
                        path: "text_and_sentiment/unreliable_tiles.png",
                    },
                ]),
            },
        ],
    },
];
