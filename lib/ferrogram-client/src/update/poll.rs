// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ferrogram_tl_types as tl;

/// Occurs when the results of a poll change.
#[derive(Debug, Clone)]
pub struct Poll {
    pub raw: tl::enums::Update,
}

impl Poll {
    fn results(&self) -> &tl::types::PollResults {
        match &self.raw {
            tl::enums::Update::MessagePoll(update) => {
                let tl::enums::PollResults::PollResults(results) = &update.results;
                results
            }
            _ => unreachable!(),
        }
    }

    pub fn poll_id(&self) -> i64 {
        match &self.raw {
            tl::enums::Update::MessagePoll(update) => update.poll_id,
            _ => unreachable!(),
        }
    }

    /// Total amount of people who voted, if known.
    pub fn total_voters(&self) -> Option<i32> {
        self.results().total_voters
    }

    /// Votes for each of the options, as `(option, voters)` pairs.
    ///
    /// Empty if the update only carries a partial snapshot of the results.
    pub fn votes(&self) -> impl Iterator<Item = (&[u8], i32)> {
        self.results()
            .results
            .iter()
            .flatten()
            .map(|tl::enums::PollAnswerVoters::PollAnswerVoters(answer)| {
                (answer.option.as_slice(), answer.voters)
            })
    }
}
