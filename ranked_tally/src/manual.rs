/*!

This is the long-form manual for `ranked_tally` and `rtally`.

## Tabulation methods

### Borda counts (`borda`)

Every ballot gives points to every candidate according to its rank (0 is the
most preferred, C is the number of candidates):

| system       | points for rank r          |
|--------------|----------------------------|
| `BC`         | C - r                      |
| `0-BC`       | C - r - 1                  |
| `Dowdall`    | 1 / (r + 1)                |
| `Dowdall-AR` | 1 / (r + 1), rounded to 2 decimal places (ties to even, so 1/8 gives 0.12) |
| `Power`      | 1 / 2^r                    |

Only the scores are reported. No winner is declared and no tie is broken.

### Instant-runoff voting (`irv`)

Each round counts the first choices among the remaining candidates. A candidate
with strictly more than half of the ballots wins. Otherwise *all* the candidates
with the fewest first choices are eliminated in the same round and their ballots
move to the next remaining choice. When the last remaining candidates are all
eliminated in one round, they are declared tied.

Simultaneous elimination can change the outcome compared to eliminating one
candidate at a time.

### Ranked pairs (`rpv`)

Every pair of candidates is compared. The winner of a pair is the candidate
ranked ahead on more ballots; when both have the same count, the candidate
listed first in the header is named the winner with a margin of 0.

The pairs are sorted by decreasing margin. For equal margins, the pair
`W1 > L1` comes before `W2 > L2` when the margin of `W1` over `L2` is smaller
than the margin of `W2` over `L1`. Pairs that are still equal keep the order of
the tally (by header position) and are listed as ambiguous orderings. Setting
`nonStrictPairOrdering` to `fail` turns them into an error instead.

The pairs are then locked in that order, unless locking a pair would create a
cycle with the pairs already locked. The winners are the candidates that no
locked pair defeats.

## Input formats

The ballot table has a header row with the candidate names, then one row per
ballot with the rank of each candidate:

```text
Alice,Bob,Charlie
1,2,3
3,1,2
2,3,1
```

By default the ranks start at 1 (`rankBase`). Every row must rank every
candidate exactly once; rows that do not are reported as spoiled and the
election is not tabulated. `rtally --check-ballots` lists them as
`line N: spoiled ballot: ...`, where N counts the ballots from 1, the header
row excluded.

* `csv` comma separated values
* `xlsx` the first (or the named) worksheet of an Excel file, same layout

## Configuration

`rtally` can read a JSON configuration file:

```json
{
  "outputSettings": {
    "contestName": "Meme election",
    "contestDate": "2024-05-01"
  },
  "ballotSource": {
    "provider": "csv",
    "filePath": "ballots.csv",
    "rankBase": 1
  },
  "rules": {
    "methods": ["irv", "borda", "rpv"],
    "scoringSystems": ["BC", "0-BC", "Dowdall", "Dowdall-AR", "Power"],
    "nonStrictPairOrdering": "flag"
  }
}
```

The `filePath` is relative to the configuration file. Every option of the
`rules` section is optional. Command line flags take precedence over the file.

*/
